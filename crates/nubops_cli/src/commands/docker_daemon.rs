//! docker-daemon command - Docker daemon settings.

use clap::Args;

use super::TemplateFamily;

#[derive(Args, Debug)]
pub struct DockerDaemonArgs {
    /// Folder docker keeps images and containers in
    #[arg(long, default_value = "/var/lib/docker")]
    pub data_root: String,

    /// Size a container log may grow to before it is rotated
    #[arg(long, default_value = "10m")]
    pub log_max_size: String,

    /// Number of rotated logs kept per container
    #[arg(long, default_value = "3")]
    pub log_max_file: u32,
}

impl TemplateFamily for DockerDaemonArgs {
    fn name(&self) -> &'static str {
        "docker-daemon"
    }

    fn arguments(&self) -> Vec<(&'static str, String)> {
        vec![
            ("data-root", self.data_root.clone()),
            ("log-max-size", self.log_max_size.clone()),
            ("log-max-file", self.log_max_file.to_string()),
        ]
    }
}
