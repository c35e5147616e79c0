use utoipa::ToSchema;

pub const EMAIL_PARAM: &str = "email";

#[derive(serde_derive::Deserialize, ToSchema)]
pub struct CheckEmailRequest {
    pub email: String,
}
