//! Stand-in provisioning workflow.
//!
//! Walks through the phases of bringing up a cluster on AWS without touching
//! any cloud API, pausing on the same questions a real install asks.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use tracing::info;

use crate::prompt::random_id;

use super::{Completion, Workflow, WorkflowContext, WorkflowError};

const DEFAULT_VPC_CIDR: &str = "10.0.0.0/16";
const DEFAULT_SUBNET_CIDR: &str = "10.0.0.0/21";
const GENERATED_DOMAIN_SUFFIX: &str = "hoist.local";

/// AWS access key pair. The secret never appears in logs.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl AwsCredentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }

    /// Both halves present and non-empty.
    pub fn is_complete(&self) -> bool {
        !self.access_key_id.is_empty() && !self.secret_access_key.is_empty()
    }

    /// Read `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`.
    pub fn from_env() -> Option<Self> {
        let creds = Self::new(
            std::env::var("AWS_ACCESS_KEY_ID").ok()?,
            std::env::var("AWS_SECRET_ACCESS_KEY").ok()?,
        );
        creds.is_complete().then_some(creds)
    }
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .finish()
    }
}

/// Parameters of one install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSpec {
    pub credentials: AwsCredentials,
    pub region: String,
    pub instance_type: String,
    pub num_instances: u32,
    pub vpc_cidr: Option<String>,
    pub subnet_cidr: Option<String>,
}

/// Simulated cluster bring-up.
pub struct SimulatedStack {
    spec: StackSpec,
    step_delay: Duration,
}

impl SimulatedStack {
    pub const fn new(spec: StackSpec, step_delay: Duration) -> Self {
        Self { spec, step_delay }
    }

    async fn step(&self, ctx: &WorkflowContext, description: impl Into<String>) {
        ctx.status(description);
        if !self.step_delay.is_zero() {
            tokio::time::sleep(self.step_delay).await;
        }
    }
}

#[async_trait]
impl Workflow for SimulatedStack {
    async fn run(self: Box<Self>, ctx: WorkflowContext) -> Result<Completion, WorkflowError> {
        let spec = &self.spec;
        info!(
            session_id = %ctx.session_id(),
            region = %spec.region,
            instance_type = %spec.instance_type,
            num_instances = spec.num_instances,
            access_key_id = %spec.credentials.access_key_id,
            "Starting simulated install"
        );

        self.step(&ctx, format!("Checking AWS credentials for {}", spec.region))
            .await;
        let vpc = spec.vpc_cidr.as_deref().unwrap_or(DEFAULT_VPC_CIDR);
        self.step(&ctx, format!("Creating VPC {vpc}")).await;
        let subnet = spec.subnet_cidr.as_deref().unwrap_or(DEFAULT_SUBNET_CIDR);
        self.step(&ctx, format!("Creating subnet {subnet}")).await;

        let confirmed = ctx
            .ask_yes_no(format!(
                "Create {} {} instance(s) in {}?",
                spec.num_instances, spec.instance_type, spec.region
            ))
            .await?;
        if !confirmed {
            return Err(WorkflowError::Cancelled);
        }

        for n in 1..=spec.num_instances {
            self.step(
                &ctx,
                format!("Starting instance {n} of {} ({})", spec.num_instances, spec.instance_type),
            )
            .await;
        }
        self.step(&ctx, "Waiting for cluster to bootstrap").await;

        let answer = ctx
            .ask_text("Domain name for the cluster (leave blank to generate one)")
            .await?;
        let domain = match answer.trim() {
            "" => format!("{}.{GENERATED_DOMAIN_SUFFIX}", &random_id()[..12]),
            named => named.to_string(),
        };
        self.step(&ctx, format!("Configuring DNS for {domain}")).await;

        Ok(Completion {
            domain: Some(domain),
            dashboard_login_token: Some(random_id()),
            ca_cert: Some(placeholder_ca_cert()),
        })
    }
}

/// PEM-shaped certificate with a random body.
fn placeholder_ca_cert() -> String {
    let body = STANDARD.encode(rand::random::<[u8; 48]>());
    format!("-----BEGIN CERTIFICATE-----\n{body}\n-----END CERTIFICATE-----\n")
}
