//! Pipeline and environment provisioning sequence.
//!
//! Creates one pipeline and one environment per deployment stage, in a
//! fixed order, stopping at the first failure. Progress lines stream to
//! stdout as each resource is created; resources created before a failure
//! are left in place.

use serde::Serialize;

use crate::devops::{DevOpsClient, EnvironmentCreateRequest, PipelineCreateRequest};
use crate::error::{Error, Result};
use crate::utils::validation;

/// Deployment stages that get an environment, in creation order.
pub const ENVIRONMENTS: [&str; 3] = ["dev", "qa", "prd"];

pub const DEFAULT_YAML_PATH: &str = "azure-pipelines.yaml";

#[derive(Debug, Clone)]
pub struct ProvisionParams {
    pub access_token: String,
    pub repository_full_name: String,
    pub organization: String,
    pub project: String,
    pub folder: Option<String>,
    pub connection_id: String,
    pub yaml_path: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionOutput {
    pub pipeline_name: String,
    pub environments: Vec<String>,
}

/// Splits `{owner}/{repo}` into its two halves.
pub fn split_repository_full_name(full_name: &str) -> Result<(&str, &str)> {
    match full_name.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner, repo))
        }
        _ => Err(Error::validation_invalid_argument(
            "repository_full_name",
            format!("Expected {{owner}}/{{repo}}, got '{}'", full_name),
        )),
    }
}

/// Derives the pipeline name from the repository full name.
pub fn pipeline_name(repository_full_name: &str) -> String {
    repository_full_name.replace('/', ".")
}

pub fn run(params: &ProvisionParams) -> Result<ProvisionOutput> {
    validate(params)?;

    let client = DevOpsClient::new(&params.organization, &params.project, &params.access_token);
    provision(&client, params)
}

fn validate(params: &ProvisionParams) -> Result<()> {
    validation::require_non_empty(
        &params.access_token,
        "azure_devops_access_token",
        "Access token must not be empty",
    )?;
    validation::require_non_empty(
        &params.connection_id,
        "connection_id",
        "Connection ID must not be empty",
    )?;
    validation::require_non_empty(
        &params.organization,
        "devops_organization",
        "Organization must not be empty",
    )?;
    validation::require_non_empty(
        &params.project,
        "devops_project",
        "Project must not be empty",
    )?;
    split_repository_full_name(&params.repository_full_name)?;

    Ok(())
}

/// Runs the provisioning sequence against an already-constructed client.
pub fn provision(client: &DevOpsClient, params: &ProvisionParams) -> Result<ProvisionOutput> {
    let (_, short_name) = split_repository_full_name(&params.repository_full_name)?;
    let name = pipeline_name(&params.repository_full_name);

    log_status!(
        "provision",
        "Creating pipeline {} in {}/{}",
        name,
        params.organization,
        params.project
    );
    let request = PipelineCreateRequest::new(
        name.clone(),
        params.folder.clone(),
        params.yaml_path.clone(),
        params.repository_full_name.clone(),
        params.connection_id.clone(),
    );
    client.create_pipeline(&request)?;
    println!("Pipeline {} created!", name);

    let mut environments = Vec::with_capacity(ENVIRONMENTS.len());
    for env in ENVIRONMENTS {
        let env_name = format!("{}-{}", short_name, env);

        log_status!("provision", "Creating environment {}", env_name);
        client.create_environment(&EnvironmentCreateRequest {
            name: env_name.clone(),
            description: String::new(),
        })?;
        // Downstream automation parses this line; keep the historical spelling.
        println!("Enviroment {} created!", env_name);
        environments.push(env_name);
    }

    println!("Done!");

    Ok(ProvisionOutput {
        pipeline_name: name,
        environments,
    })
}
