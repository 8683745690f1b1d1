//! Typed calls for each backend endpoint.
//!
//! Input checks happen here, before anything is sent, and 2xx responses that
//! lack a field the shell needs are turned into [`ShellError::Contract`].
//! Nothing in this module writes to the credential store; the session flows own that.

use crate::credential_store::{CredentialScope, CredentialStore};
use crate::error::ShellError;
use crate::gateway::{AuthScope, Gateway, RequestDescriptor, Transport};
use crate::types::{
    decode_list, extract_token, AuditEntry, ChainStatus, Credentials, Profile, TransferRequest,
    TxRecord, ADMIN_TOKEN_FIELDS, USER_TOKEN_FIELDS,
};
use serde_json::Value;

#[derive(Clone)]
pub struct Api<T> {
    gateway: Gateway<T>,
}

impl<T: Transport> Api<T> {
    pub fn new(gateway: Gateway<T>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Gateway<T> {
        &self.gateway
    }

    pub fn credentials(&self) -> &CredentialStore {
        self.gateway.credentials()
    }

    async fn call(&self, descriptor: RequestDescriptor) -> Result<Value, ShellError> {
        self.gateway.send(descriptor).await?.into_result()
    }

    // ----- auth -----

    /// Returns the access token if the backend issued one on registration.
    pub async fn register(&self, email: &str, password: &str) -> Result<Option<String>, ShellError> {
        let credentials = credentials(email, password)?;
        let data = self
            .call(RequestDescriptor::post(["auth", "register"]).json(to_json(&credentials)))
            .await?;
        Ok(extract_token(&data, USER_TOKEN_FIELDS))
    }

    /// A 2xx reply without a token is a failure: there is nothing to sign in with.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ShellError> {
        let credentials = credentials(email, password)?;
        let data = self
            .call(RequestDescriptor::post(["auth", "login"]).json(to_json(&credentials)))
            .await?;
        extract_token(&data, USER_TOKEN_FIELDS).ok_or_else(|| ShellError::contract("Token not returned"))
    }

    /// Identity-validation probe.
    pub async fn me(&self) -> Result<Profile, ShellError> {
        let data = self
            .call(RequestDescriptor::get(["users", "me"]).scope(AuthScope::User))
            .await?;
        // Derived Deserialize would also accept a JSON array.
        if !data.is_object() {
            tracing::warn!("Unexpected /users/me payload: not an object");
            return Err(ShellError::contract("Profile response was not understood"));
        }
        serde_json::from_value(data).map_err(|e| {
            tracing::warn!("Unexpected /users/me payload: {}", e);
            ShellError::contract("Profile response was not understood")
        })
    }

    // ----- transactions -----

    /// Returns the created transaction record as sent by the server.
    pub async fn create_transfer(&self, to_address: &str, amount: &str) -> Result<Value, ShellError> {
        if to_address.trim().is_empty() || amount.trim().is_empty() {
            return Err(ShellError::validation("Enter a recipient address and an amount"));
        }
        let request = TransferRequest::new(to_address, amount);
        self.call(
            RequestDescriptor::post(["tx", "create"])
                .scope(AuthScope::User)
                .json(to_json(&request)),
        )
        .await
    }

    pub async fn history(&self) -> Result<Vec<TxRecord>, ShellError> {
        let data = self
            .call(RequestDescriptor::get(["tx", "history"]).scope(AuthScope::User))
            .await?;
        Ok(decode_list(data))
    }

    // ----- explorer -----

    pub async fn explorer_tx(&self, block_hash: &str) -> Result<Value, ShellError> {
        let block_hash = required(block_hash, "Enter a block hash")?;
        self.call(RequestDescriptor::get(["explorer", "tx", block_hash]).scope(AuthScope::User))
            .await
    }

    pub async fn explorer_address(&self, address: &str) -> Result<Value, ShellError> {
        let address = required(address, "Enter an address")?;
        self.call(RequestDescriptor::get(["explorer", "address", address]).scope(AuthScope::User))
            .await
    }

    pub async fn verify_chain(&self) -> Result<ChainStatus, ShellError> {
        let data = self
            .call(RequestDescriptor::get(["explorer", "verify-chain"]).scope(AuthScope::User))
            .await?;
        Ok(ChainStatus::from_response(&data))
    }

    // ----- admin -----

    /// The backend reads the password as a query parameter, not a body field.
    pub async fn admin_login(&self, password: &str) -> Result<String, ShellError> {
        let password = required(password, "Enter the admin password")?;
        let data = self
            .call(RequestDescriptor::post(["admin", "login"]).query("password", password))
            .await?;
        extract_token(&data, ADMIN_TOKEN_FIELDS).ok_or_else(|| ShellError::contract("Admin token not returned"))
    }

    pub async fn freeze(&self, email: &str) -> Result<Value, ShellError> {
        self.set_frozen(email, true).await
    }

    pub async fn unfreeze(&self, email: &str) -> Result<Value, ShellError> {
        self.set_frozen(email, false).await
    }

    async fn set_frozen(&self, email: &str, frozen: bool) -> Result<Value, ShellError> {
        self.require_admin()?;
        let email = required(email, "Enter an email")?;
        let action = if frozen { "freeze" } else { "unfreeze" };
        self.call(RequestDescriptor::post(["admin", action, email]).scope(AuthScope::Admin))
            .await
    }

    pub async fn audit(&self) -> Result<Vec<AuditEntry>, ShellError> {
        self.require_admin()?;
        let data = self
            .call(RequestDescriptor::get(["admin", "audit"]).scope(AuthScope::Admin))
            .await?;
        Ok(decode_list(data))
    }

    fn require_admin(&self) -> Result<(), ShellError> {
        if self.credentials().has(CredentialScope::Admin) {
            Ok(())
        } else {
            Err(ShellError::validation("Sign in as admin first"))
        }
    }
}

fn credentials(email: &str, password: &str) -> Result<Credentials, ShellError> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(ShellError::validation("Enter your email and password"));
    }
    Ok(Credentials {
        email: email.to_string(),
        password: password.to_string(),
    })
}

fn required<'a>(value: &'a str, message: &str) -> Result<&'a str, ShellError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ShellError::validation(message))
    } else {
        Ok(value)
    }
}

fn to_json<S: serde::Serialize>(value: &S) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
