//! Installation commands derived from a package id and version

use serde::{Deserialize, Serialize};

/// Ways to add a package to a .NET project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallationInfo {
    pub dotnet_cli: String,
    pub package_manager: String,
    pub package_reference: String,
    pub paket: String,
}

impl InstallationInfo {
    /// Commands pinned to `version`, or floating when `version` is `None`
    pub fn for_package(package_id: &str, version: Option<&str>) -> Self {
        match version {
            Some(version) => Self {
                dotnet_cli: format!("{} --version {}", dotnet_add_command(package_id), version),
                package_manager: format!("Install-Package {} -Version {}", package_id, version),
                package_reference: format!(
                    "<PackageReference Include=\"{}\" Version=\"{}\" />",
                    package_id, version
                ),
                paket: format!("paket add {} --version {}", package_id, version),
            },
            None => Self {
                dotnet_cli: dotnet_add_command(package_id),
                package_manager: format!("Install-Package {}", package_id),
                package_reference: format!("<PackageReference Include=\"{}\" />", package_id),
                paket: format!("paket add {}", package_id),
            },
        }
    }
}

/// `dotnet add package <id>`
pub fn dotnet_add_command(package_id: &str) -> String {
    format!("dotnet add package {}", package_id)
}
