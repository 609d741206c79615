use clap::Parser;

use azpipe::provision::{self, ProvisionParams};
use azpipe::ErrorCode;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "azpipe")]
#[command(version = VERSION)]
#[command(
    about = "Provision an Azure DevOps pipeline and its deployment environments for a GitHub repository"
)]
struct Cli {
    /// Azure DevOps personal access token
    #[arg(long, value_name = "TOKEN")]
    azure_devops_access_token: String,

    /// GitHub repository as {owner}/{repo}
    #[arg(long, value_name = "OWNER/REPO")]
    repository_full_name: String,

    /// Azure DevOps organization name
    #[arg(long)]
    devops_organization: String,

    /// Azure DevOps project name
    #[arg(long)]
    devops_project: String,

    /// Target folder for the pipeline
    #[arg(long)]
    devops_folder: Option<String>,

    /// Service connection linking Azure DevOps to GitHub
    #[arg(long, value_name = "ID")]
    connection_id: String,

    /// Path to the pipeline manifest inside the repository
    #[arg(long, default_value = provision::DEFAULT_YAML_PATH)]
    yaml_path: String,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let params = ProvisionParams {
        access_token: cli.azure_devops_access_token,
        repository_full_name: cli.repository_full_name,
        organization: cli.devops_organization,
        project: cli.devops_project,
        folder: cli.devops_folder,
        connection_id: cli.connection_id,
        yaml_path: cli.yaml_path,
    };

    match provision::run(&params) {
        Ok(_) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            std::process::ExitCode::from(exit_code_to_u8(exit_code_for_error(err.code)))
        }
    }
}

fn exit_code_for_error(code: ErrorCode) -> i32 {
    match code {
        ErrorCode::ValidationInvalidArgument => 2,

        ErrorCode::AuthTokenRejected => 10,

        ErrorCode::ApiRequestFailed | ErrorCode::HttpRequestFailed => 20,

        ErrorCode::InternalJsonError => 1,
    }
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_error_class_maps_to_a_non_zero_exit_code() {
        for code in [
            ErrorCode::ValidationInvalidArgument,
            ErrorCode::AuthTokenRejected,
            ErrorCode::ApiRequestFailed,
            ErrorCode::HttpRequestFailed,
            ErrorCode::InternalJsonError,
        ] {
            assert_ne!(exit_code_to_u8(exit_code_for_error(code)), 0);
        }
    }

    #[test]
    fn exit_codes_clamp_to_u8_range() {
        assert_eq!(exit_code_to_u8(-1), 0);
        assert_eq!(exit_code_to_u8(20), 20);
        assert_eq!(exit_code_to_u8(300), 255);
    }
}
