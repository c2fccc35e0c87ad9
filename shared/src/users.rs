use async_trait::async_trait;
use aws_sdk_dynamodb::{types::AttributeValue, Client as DynamoClient};
use std::collections::HashMap;

use crate::error::ApiError;
use crate::types::UserRecord;

/// Key-value access to user records, keyed by email.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new record. Fails with `UserExists` if the email is taken.
    async fn create_user(&self, user: &UserRecord) -> Result<(), ApiError>;

    async fn get_user(&self, email: &str) -> Result<Option<UserRecord>, ApiError>;

    /// Set the profile image URL. Fails with `UserNotFound` if no record exists.
    async fn update_profile_image(&self, email: &str, url: &str) -> Result<(), ApiError>;
}

/// DynamoDB-backed store: one item per user, partition key `email`.
pub struct DynamoRecordStore {
    client: DynamoClient,
    table_name: String,
}

impl DynamoRecordStore {
    pub fn new(client: DynamoClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

#[async_trait]
impl RecordStore for DynamoRecordStore {
    async fn create_user(&self, user: &UserRecord) -> Result<(), ApiError> {
        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(user_to_item(user)))
            .condition_expression("attribute_not_exists(email)")
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e)
                if e.as_service_error()
                    .map(|se| se.is_conditional_check_failed_exception())
                    .unwrap_or(false) =>
            {
                tracing::info!("Signup rejected, record exists for {}", user.email);
                Err(ApiError::UserExists)
            }
            Err(e) => {
                tracing::error!("DynamoDB put_item failed: {:?}", e);
                Err(ApiError::RecordStore(e.to_string()))
            }
        }
    }

    async fn get_user(&self, email: &str) -> Result<Option<UserRecord>, ApiError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("email", AttributeValue::S(email.to_string()))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("DynamoDB get_item failed: {:?}", e);
                ApiError::RecordStore(e.to_string())
            })?;

        result.item().map(user_from_item).transpose()
    }

    async fn update_profile_image(&self, email: &str, url: &str) -> Result<(), ApiError> {
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("email", AttributeValue::S(email.to_string()))
            .update_expression("SET profile_image = :newImage")
            .condition_expression("attribute_exists(email)")
            .expression_attribute_values(":newImage", AttributeValue::S(url.to_string()))
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e)
                if e.as_service_error()
                    .map(|se| se.is_conditional_check_failed_exception())
                    .unwrap_or(false) =>
            {
                Err(ApiError::UserNotFound)
            }
            Err(e) => {
                tracing::error!("DynamoDB update_item failed: {:?}", e);
                Err(ApiError::RecordStore(e.to_string()))
            }
        }
    }
}

/// Item layout: email, name, password, salt, profile_image, datetime.
pub fn user_to_item(user: &UserRecord) -> HashMap<String, AttributeValue> {
    HashMap::from([
        ("email".to_string(), AttributeValue::S(user.email.clone())),
        ("name".to_string(), AttributeValue::S(user.name.clone())),
        ("password".to_string(), AttributeValue::S(user.password_hash.clone())),
        ("salt".to_string(), AttributeValue::S(user.salt.clone())),
        (
            "profile_image".to_string(),
            AttributeValue::S(user.profile_image_url.clone()),
        ),
        ("datetime".to_string(), AttributeValue::S(user.created_at.clone())),
    ])
}

pub fn user_from_item(item: &HashMap<String, AttributeValue>) -> Result<UserRecord, ApiError> {
    let string = |name: &str| -> Result<String, ApiError> {
        item.get(name)
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .ok_or_else(|| ApiError::RecordStore(format!("user item is missing `{}`", name)))
    };

    Ok(UserRecord {
        email: string("email")?,
        name: item
            .get("name")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_default(),
        password_hash: string("password")?,
        salt: string("salt")?,
        profile_image_url: item
            .get("profile_image")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_default(),
        created_at: item
            .get("datetime")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::config::retry::RetryConfig;
    use aws_sdk_dynamodb::config::{
        BehaviorVersion, Credentials, Region, StalledStreamProtectionConfig,
    };
    use aws_smithy_http_client::test_util::{ReplayEvent, StaticReplayClient};
    use aws_smithy_types::body::SdkBody;
    use lambda_http::http;

    fn alice() -> UserRecord {
        UserRecord {
            email: "a@b.com".to_string(),
            name: "Alice".to_string(),
            password_hash: "ab".repeat(64),
            salt: "cd".repeat(16),
            profile_image_url: "https://bucket.s3.amazonaws.com/avatar.png".to_string(),
            created_at: "2024-05-01T12:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn item_has_six_string_attributes() {
        let item = user_to_item(&alice());
        assert_eq!(item.len(), 6);
        assert_eq!(item["password"], AttributeValue::S("ab".repeat(64)));
        assert_eq!(
            item["profile_image"],
            AttributeValue::S("https://bucket.s3.amazonaws.com/avatar.png".to_string())
        );
        assert!(item.values().all(|v| v.is_s()));
    }

    #[test]
    fn item_round_trips() {
        let user = alice();
        assert_eq!(user_from_item(&user_to_item(&user)).unwrap(), user);
    }

    #[test]
    fn item_without_salt_is_rejected() {
        let mut item = user_to_item(&alice());
        item.remove("salt");
        let err = user_from_item(&item).unwrap_err();
        assert!(matches!(err, ApiError::RecordStore(ref m) if m.contains("salt")));
    }

    fn replay_request() -> http::Request<SdkBody> {
        http::Request::builder()
            .uri("https://dynamodb.us-east-1.amazonaws.com/")
            .body(SdkBody::empty())
            .unwrap()
    }

    fn dynamo_response(status: u16, body: &str) -> http::Response<SdkBody> {
        http::Response::builder()
            .status(status)
            .header("content-type", "application/x-amz-json-1.0")
            .body(SdkBody::from(body.to_string()))
            .unwrap()
    }

    fn conditional_check_failed() -> http::Response<SdkBody> {
        dynamo_response(
            400,
            r#"{"__type":"com.amazonaws.dynamodb.v20120810#ConditionalCheckFailedException","message":"The conditional request failed"}"#,
        )
    }

    fn store_with(events: Vec<ReplayEvent>) -> (DynamoRecordStore, StaticReplayClient) {
        let http_client = StaticReplayClient::new(events);
        let config = aws_sdk_dynamodb::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .stalled_stream_protection(StalledStreamProtectionConfig::disabled())
            .credentials_provider(Credentials::new("AKIDTEST", "secret", None, None, "test"))
            .region(Region::new("us-east-1"))
            .retry_config(RetryConfig::disabled())
            .http_client(http_client.clone())
            .build();
        let store = DynamoRecordStore::new(DynamoClient::from_conf(config), "Users");
        (store, http_client)
    }

    /// Target operation and JSON body of every request the client sent.
    fn sent(http_client: &StaticReplayClient) -> Vec<(String, serde_json::Value)> {
        http_client
            .actual_requests()
            .map(|req| {
                let target = req.headers().get("x-amz-target").unwrap_or("").to_string();
                let body = serde_json::from_slice(req.body().bytes().unwrap()).unwrap();
                (target, body)
            })
            .collect()
    }

    #[tokio::test]
    async fn create_user_is_conditional_on_a_new_email() {
        let (store, http_client) =
            store_with(vec![ReplayEvent::new(replay_request(), dynamo_response(200, "{}"))]);

        store.create_user(&alice()).await.unwrap();

        let sent = sent(&http_client);
        assert_eq!(sent.len(), 1);
        let (target, body) = &sent[0];
        assert_eq!(target, "DynamoDB_20120810.PutItem");
        assert_eq!(body["TableName"], "Users");
        assert_eq!(body["ConditionExpression"], "attribute_not_exists(email)");
        assert_eq!(body["Item"]["email"]["S"], "a@b.com");
        assert_eq!(body["Item"]["password"]["S"], "ab".repeat(64));
    }

    #[tokio::test]
    async fn create_user_maps_failed_condition_to_user_exists() {
        let (store, _) =
            store_with(vec![ReplayEvent::new(replay_request(), conditional_check_failed())]);

        let err = store.create_user(&alice()).await.unwrap_err();
        assert!(matches!(err, ApiError::UserExists));
    }

    #[tokio::test]
    async fn create_user_maps_other_failures_to_record_store() {
        let (store, _) = store_with(vec![ReplayEvent::new(
            replay_request(),
            dynamo_response(
                400,
                r#"{"__type":"com.amazonaws.dynamodb.v20120810#ResourceNotFoundException","message":"Requested resource not found"}"#,
            ),
        )]);

        let err = store.create_user(&alice()).await.unwrap_err();
        assert!(matches!(err, ApiError::RecordStore(_)));
        assert_eq!(err.body(), serde_json::json!({"error": "Record store request failed"}));
    }

    #[tokio::test]
    async fn get_user_reads_the_item() {
        let item = r#"{"Item":{
            "email":{"S":"a@b.com"},
            "name":{"S":"Alice"},
            "password":{"S":"abab"},
            "salt":{"S":"cdcd"},
            "profile_image":{"S":"https://bucket.s3.amazonaws.com/avatar.png"},
            "datetime":{"S":"2024-05-01T12:00:00.000Z"}
        }}"#;
        let (store, http_client) = store_with(vec![
            ReplayEvent::new(replay_request(), dynamo_response(200, item)),
            ReplayEvent::new(replay_request(), dynamo_response(200, "{}")),
        ]);

        let user = store.get_user("a@b.com").await.unwrap().unwrap();
        assert_eq!(user.name, "Alice");
        assert_eq!(user.salt, "cdcd");
        assert_eq!(user.profile_image_url, "https://bucket.s3.amazonaws.com/avatar.png");

        assert!(store.get_user("nobody@b.com").await.unwrap().is_none());

        let sent = sent(&http_client);
        assert_eq!(sent[0].0, "DynamoDB_20120810.GetItem");
        assert_eq!(sent[0].1["Key"]["email"]["S"], "a@b.com");
        assert_eq!(sent[1].1["Key"]["email"]["S"], "nobody@b.com");
    }

    #[tokio::test]
    async fn update_requires_an_existing_record() {
        let (store, http_client) = store_with(vec![
            ReplayEvent::new(replay_request(), dynamo_response(200, "{}")),
            ReplayEvent::new(replay_request(), conditional_check_failed()),
        ]);

        store
            .update_profile_image("a@b.com", "https://bucket.s3.amazonaws.com/new.png")
            .await
            .unwrap();
        let err = store
            .update_profile_image("nobody@b.com", "https://bucket.s3.amazonaws.com/new.png")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::UserNotFound));

        let sent = sent(&http_client);
        let (target, body) = &sent[0];
        assert_eq!(target, "DynamoDB_20120810.UpdateItem");
        assert_eq!(body["ConditionExpression"], "attribute_exists(email)");
        assert_eq!(body["UpdateExpression"], "SET profile_image = :newImage");
        assert_eq!(
            body["ExpressionAttributeValues"][":newImage"]["S"],
            "https://bucket.s3.amazonaws.com/new.png"
        );
    }
}
