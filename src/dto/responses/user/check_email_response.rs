use serde_derive::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema, Debug, Default, PartialEq, Eq)]
pub struct CheckEmailResponse {}
