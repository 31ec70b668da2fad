//! Production instance provisioning
//!
//! One creation request per configured service, issued one after another.
//! A failed request is recorded and the loop moves on, so every service gets
//! its attempt; the caller receives the full list of failures.

use std::fmt;
use std::future::Future;

use super::error::CloudError;
use crate::config::CloudConfig;
use crate::deploy::{DeployError, MASK};

/// Cloud API credential
///
/// Never printed in full; `Debug` and `Display` show a mask.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Wrap a token, rejecting empty or blank values
    pub fn new(token: impl Into<String>) -> Result<Self, DeployError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(DeployError::Validation(
                "Cloud API token is required (pass --API_TOKEN or set API_TOKEN)".to_string(),
            ));
        }
        Ok(Self(token))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// First four characters, for confirming which token is in use
    pub fn preview(&self) -> String {
        let head: String = self.0.chars().take(4).collect();
        format!("{head}...")
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiToken({MASK})")
    }
}

impl fmt::Display for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASK)
    }
}

/// Identifier of a created instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceId(pub u64);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parameters of one instance to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRequest {
    pub name: String,
    pub region: String,
    pub size: String,
    pub image: String,
    pub ssh_keys: Vec<String>,
}

impl InstanceRequest {
    /// Name, region and image must all be non-empty
    pub fn validate(&self) -> Result<(), CloudError> {
        for (field, value) in [
            ("name", &self.name),
            ("region", &self.region),
            ("image", &self.image),
        ] {
            if value.trim().is_empty() {
                return Err(CloudError::InvalidRequest(format!(
                    "{field} must not be empty"
                )));
            }
        }
        Ok(())
    }
}

/// Creates instances with a cloud provider
pub trait CloudProvider {
    fn create_instance(
        &self,
        request: &InstanceRequest,
    ) -> impl Future<Output = Result<InstanceId, CloudError>>;
}

/// Parameters of the prod scenario
#[derive(Debug, Clone, Default)]
pub struct ProdParams {
    /// Label for this provisioning run
    pub name: String,
    pub api_token: Option<String>,
    /// Fingerprint used when the config lists none (`FINGERPRINT` env)
    pub fallback_fingerprint: Option<String>,
}

/// Ordered creation requests plus the credential they run with
#[derive(Debug, Clone)]
pub struct ProdPlan {
    name: String,
    token: ApiToken,
    requests: Vec<InstanceRequest>,
}

impl ProdPlan {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn token(&self) -> &ApiToken {
        &self.token
    }

    pub fn requests(&self) -> &[InstanceRequest] {
        &self.requests
    }
}

/// Build the prod plan
///
/// Fails with a validation error, before any request exists, when the API
/// token is missing or blank.
pub fn build_prod_plan(cloud: &CloudConfig, params: &ProdParams) -> Result<ProdPlan, DeployError> {
    let token = ApiToken::new(params.api_token.clone().unwrap_or_default())?;

    let ssh_keys = if cloud.ssh_key_fingerprints.is_empty() {
        params
            .fallback_fingerprint
            .iter()
            .filter(|f| !f.trim().is_empty())
            .cloned()
            .collect()
    } else {
        cloud.ssh_key_fingerprints.clone()
    };

    let requests = cloud
        .services
        .iter()
        .map(|service| InstanceRequest {
            name: service.clone(),
            region: cloud.region.clone(),
            size: cloud.size.clone(),
            image: cloud.image.clone(),
            ssh_keys: ssh_keys.clone(),
        })
        .collect();

    Ok(ProdPlan {
        name: params.name.clone(),
        token,
        requests,
    })
}

/// Progress notification for one creation request
#[derive(Debug)]
pub enum InstanceEvent<'a> {
    Requesting {
        index: usize,
        total: usize,
        request: &'a InstanceRequest,
    },
    Created {
        request: &'a InstanceRequest,
        id: InstanceId,
    },
    Failed {
        request: &'a InstanceRequest,
        error: &'a CloudError,
    },
}

/// Outcome of every creation request
#[derive(Debug, Default)]
pub struct ProvisionReport {
    pub created: Vec<(String, InstanceId)>,
    pub failed: Vec<(String, CloudError)>,
}

impl ProvisionReport {
    pub fn attempted(&self) -> usize {
        self.created.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Issue every creation request of `plan`, sequentially
///
/// A failed request never stops the loop; it is reported through `on_event`
/// and collected in the returned report.
pub async fn provision_all<P, F>(provider: &P, plan: &ProdPlan, mut on_event: F) -> ProvisionReport
where
    P: CloudProvider,
    F: FnMut(InstanceEvent<'_>),
{
    let total = plan.requests.len();
    let mut report = ProvisionReport::default();

    tracing::info!("Provisioning {} instances for '{}'", total, plan.name);

    for (index, request) in plan.requests.iter().enumerate() {
        on_event(InstanceEvent::Requesting {
            index,
            total,
            request,
        });

        match provider.create_instance(request).await {
            Ok(id) => {
                tracing::info!("Created instance {} with id {}", request.name, id);
                on_event(InstanceEvent::Created { request, id });
                report.created.push((request.name.clone(), id));
            }
            Err(error) => {
                tracing::warn!("Failed to create instance {}: {}", request.name, error);
                on_event(InstanceEvent::Failed {
                    request,
                    error: &error,
                });
                report.failed.push((request.name.clone(), error));
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Fails every request whose name is listed
    struct FakeProvider {
        calls: RefCell<Vec<String>>,
        fail: Vec<&'static str>,
    }

    impl FakeProvider {
        fn failing(fail: Vec<&'static str>) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                fail,
            }
        }
    }

    impl CloudProvider for FakeProvider {
        async fn create_instance(&self, request: &InstanceRequest) -> Result<InstanceId, CloudError> {
            let mut calls = self.calls.borrow_mut();
            calls.push(request.name.clone());
            if self.fail.contains(&request.name.as_str()) {
                Err(CloudError::UnexpectedStatus {
                    status: 422,
                    message: "rejected".to_string(),
                })
            } else {
                Ok(InstanceId(calls.len() as u64))
            }
        }
    }

    fn params(token: Option<&str>) -> ProdParams {
        ProdParams {
            name: "release".to_string(),
            api_token: token.map(str::to_string),
            fallback_fingerprint: None,
        }
    }

    #[test]
    fn test_plan_has_one_request_per_service() {
        let plan = build_prod_plan(&CloudConfig::default(), &params(Some("tok"))).unwrap();
        let names: Vec<&str> = plan.requests().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["checkbox", "iTrust", "monitoring"]);
        for request in plan.requests() {
            assert_eq!(request.region, "nyc1");
            assert_eq!(request.image, "debian-10-x64");
            assert_eq!(request.size, "s-1vcpu-1gb");
        }
        assert_eq!(plan.name(), "release");
    }

    #[test]
    fn test_missing_token_is_validation_error() {
        for token in [None, Some(""), Some("   ")] {
            let err = build_prod_plan(&CloudConfig::default(), &params(token)).unwrap_err();
            assert!(matches!(err, DeployError::Validation(_)));
        }
    }

    #[test]
    fn test_fingerprint_fallback() {
        let mut p = params(Some("tok"));
        p.fallback_fingerprint = Some("11:22".to_string());
        let plan = build_prod_plan(&CloudConfig::default(), &p).unwrap();
        assert_eq!(plan.requests()[0].ssh_keys, vec!["11:22"]);

        let cloud = CloudConfig {
            ssh_key_fingerprints: vec!["aa:bb".to_string()],
            ..CloudConfig::default()
        };
        let plan = build_prod_plan(&cloud, &p).unwrap();
        assert_eq!(plan.requests()[0].ssh_keys, vec!["aa:bb"]);
    }

    #[test]
    fn test_token_never_printed() {
        let token = ApiToken::new("dop_v1_abcdef").unwrap();
        assert_eq!(token.to_string(), MASK);
        assert!(!format!("{:?}", token).contains("abcdef"));
        assert_eq!(token.preview(), "dop_...");

        let plan = build_prod_plan(&CloudConfig::default(), &params(Some("dop_v1_abcdef"))).unwrap();
        assert!(!format!("{:?}", plan).contains("abcdef"));
    }

    #[test]
    fn test_request_validation() {
        let mut request = InstanceRequest {
            name: "checkbox".to_string(),
            region: "nyc1".to_string(),
            size: "s-1vcpu-1gb".to_string(),
            image: "debian-10-x64".to_string(),
            ssh_keys: Vec::new(),
        };
        assert!(request.validate().is_ok());

        request.region.clear();
        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("region"));
    }

    #[tokio::test]
    async fn test_all_requests_attempted_despite_failures() {
        let provider = FakeProvider::failing(vec!["checkbox", "iTrust"]);
        let plan = build_prod_plan(&CloudConfig::default(), &params(Some("tok"))).unwrap();

        let mut failed_events = 0;
        let report = provision_all(&provider, &plan, |event| {
            if let InstanceEvent::Failed { .. } = event {
                failed_events += 1;
            }
        })
        .await;

        assert_eq!(provider.calls.borrow().len(), 3);
        assert_eq!(report.attempted(), 3);
        assert_eq!(report.failed.len(), 2);
        assert_eq!(failed_events, 2);
        assert_eq!(report.created, vec![("monitoring".to_string(), InstanceId(3))]);
        assert!(!report.is_success());
    }

    #[tokio::test]
    async fn test_requests_issued_in_order() {
        let provider = FakeProvider::failing(Vec::new());
        let plan = build_prod_plan(&CloudConfig::default(), &params(Some("tok"))).unwrap();

        let report = provision_all(&provider, &plan, |_| {}).await;

        assert!(report.is_success());
        assert_eq!(
            *provider.calls.borrow(),
            vec!["checkbox", "iTrust", "monitoring"]
        );
    }

    #[tokio::test]
    async fn test_missing_token_means_no_calls() {
        let provider = FakeProvider::failing(Vec::new());

        let report = match build_prod_plan(&CloudConfig::default(), &params(None)) {
            Ok(plan) => Some(provision_all(&provider, &plan, |_| {}).await),
            Err(err) => {
                assert!(matches!(err, DeployError::Validation(_)));
                None
            }
        };

        assert!(report.is_none());
        assert!(provider.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_failure_of_first_request_does_not_stop_the_rest() {
        let provider = FakeProvider::failing(vec!["checkbox"]);
        let plan = build_prod_plan(&CloudConfig::default(), &params(Some("tok"))).unwrap();

        let report = provision_all(&provider, &plan, |_| {}).await;

        assert_eq!(provider.calls.borrow().len(), plan.requests().len());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.created.len(), 2);
    }
}
