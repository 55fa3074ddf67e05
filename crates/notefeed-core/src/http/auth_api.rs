use async_trait::async_trait;
use reqwest::multipart::Form;
use reqwest::Method;

use crate::auth::{AuthApi, AuthPayload, Credentials, RegisterRequest};
use crate::models::{Attachment, User};

use super::{file_part, read_json, ApiClient, ApiResult};

#[async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, credentials: &Credentials) -> ApiResult<AuthPayload> {
        let request = self.request(Method::POST, "/auth/login").json(credentials);
        let response = self.send(request).await?;
        Ok(serde_json::from_value(read_json(response).await?)?)
    }

    async fn register(&self, request: &RegisterRequest) -> ApiResult<AuthPayload> {
        let request = self
            .request(Method::POST, "/auth/register")
            .json(request);
        let response = self.send(request).await?;
        Ok(serde_json::from_value(read_json(response).await?)?)
    }

    async fn current_user(&self) -> ApiResult<User> {
        self.get_json("/users/me").await
    }

    async fn upload_profile_picture(&self, file: &Attachment) -> ApiResult<()> {
        let form = Form::new().part("file", file_part(file)?);
        let request = self
            .request(Method::POST, "/users/me/picture")
            .multipart(form);
        self.send(request).await?;
        Ok(())
    }
}
