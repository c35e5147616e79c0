use std::future::Future;

use diesel::{ExpressionMethods, QueryDsl, dsl::exists};
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::debug;

use crate::{
    errors::code_error::{CodeError, CodeErrorResp, code_err},
    schema::users,
};

/// Decides whether an email address may be used for a new account.
pub trait CheckEmail {
    fn check_email(&self, email: &str) -> impl Future<Output = Result<(), CodeErrorResp>> + Send;
}

pub struct UserService {
    pool: Pool<AsyncPgConnection>,
}

impl UserService {
    pub fn new(pool: Pool<AsyncPgConnection>) -> Self {
        Self { pool }
    }

    pub async fn get_conn(&self) -> anyhow::Result<PooledConnection<'_, AsyncPgConnection>> {
        Ok(self.pool.get().await?)
    }
}

impl CheckEmail for UserService {
    async fn check_email(&self, email: &str) -> Result<(), CodeErrorResp> {
        if !email_address::EmailAddress::is_valid(email) {
            return Err(code_err(CodeError::EMAIL_INVALID, email));
        }

        let mut conn = self
            .get_conn()
            .await
            .map_err(|e| code_err(CodeError::POOL_ERROR, e))?;

        let email_exists: bool =
            diesel::select(exists(users::table.filter(users::user_email.eq(email))))
                .get_result(&mut conn)
                .await
                .map_err(|e| code_err(CodeError::DB_QUERY_ERROR, e))?;

        drop(conn);

        if email_exists {
            return Err(code_err(CodeError::EMAIL_MUST_BE_UNIQUE, email));
        }

        debug!(email = %email, "Email is available");
        Ok(())
    }
}
