use crate::utils::semver::Version;

pub const DEFAULT_CONSTANT_NAME: &str = "APP_VERSION";

/// Renders the generated version module. The file is always rewritten as a
/// whole from this template.
pub fn render_constant_file(name: &str, version: &Version) -> String {
    format!(
        "// This file is generated by versionbump. Do not edit it by hand.\nexport const {} = \"{}\";\n",
        name, version
    )
}
