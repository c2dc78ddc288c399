//! Install request payload.

use serde::Deserialize;

use hoist_core::config::InstallDefaults;

use crate::workflow::{AwsCredentials, StackSpec};

use super::error::ApiError;

/// Body of `POST /install`. Every field may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct InstallRequest {
    pub creds: AwsCredentials,
    pub region: String,
    pub instance_type: String,
    pub num_instances: u32,
    pub vpc_cidr: Option<String>,
    pub subnet_cidr: Option<String>,
}

impl InstallRequest {
    /// Resolve the request against configured defaults.
    ///
    /// Body credentials win when both halves are present; otherwise the
    /// environment's are used, and with neither the request is rejected.
    pub fn into_spec(
        self,
        defaults: &InstallDefaults,
        env_credentials: Option<&AwsCredentials>,
    ) -> Result<StackSpec, ApiError> {
        let credentials = if self.creds.is_complete() {
            self.creds
        } else {
            env_credentials.cloned().ok_or_else(|| {
                ApiError::validation(
                    "AWS credentials required: provide creds or set AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY",
                )
            })?
        };

        Ok(StackSpec {
            credentials,
            region: or_default(self.region, &defaults.region),
            instance_type: or_default(self.instance_type, &defaults.instance_type),
            num_instances: match self.num_instances {
                0 => defaults.num_instances,
                n => n,
            },
            vpc_cidr: self.vpc_cidr.filter(|c| !c.is_empty()),
            subnet_cidr: self.subnet_cidr.filter(|c| !c.is_empty()),
        })
    }
}

fn or_default(value: String, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn request(json: &str) -> InstallRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn empty_fields_take_defaults() {
        let env = AwsCredentials::new("AKIDENV", "env-secret");
        let spec = request("{}")
            .into_spec(&InstallDefaults::default(), Some(&env))
            .unwrap();

        assert_eq!(spec.credentials, env);
        assert_eq!(spec.region, "us-east-1");
        assert_eq!(spec.instance_type, "m3.medium");
        assert_eq!(spec.num_instances, 1);
        assert_eq!(spec.vpc_cidr, None);
    }

    #[test]
    fn body_credentials_win_over_environment() {
        let env = AwsCredentials::new("AKIDENV", "env-secret");
        let spec = request(
            r#"{"creds": {"access_key_id": "AKIDBODY", "secret_access_key": "s"},
                "region": "eu-west-1", "num_instances": 3, "vpc_cidr": "10.2.0.0/16"}"#,
        )
        .into_spec(&InstallDefaults::default(), Some(&env))
        .unwrap();

        assert_eq!(spec.credentials.access_key_id, "AKIDBODY");
        assert_eq!(spec.region, "eu-west-1");
        assert_eq!(spec.num_instances, 3);
        assert_eq!(spec.vpc_cidr.as_deref(), Some("10.2.0.0/16"));
    }

    #[test]
    fn half_credentials_fall_back_to_environment() {
        let env = AwsCredentials::new("AKIDENV", "env-secret");
        let spec = request(r#"{"creds": {"access_key_id": "AKIDBODY"}}"#)
            .into_spec(&InstallDefaults::default(), Some(&env))
            .unwrap();
        assert_eq!(spec.credentials, env);
    }

    #[test]
    fn missing_credentials_is_validation_error() {
        let err = request("{}")
            .into_spec(&InstallDefaults::default(), None)
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
