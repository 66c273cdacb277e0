//! nginx-django command - Nginx and gunicorn for a Django project.

use clap::Args;

use super::TemplateFamily;

#[derive(Args, Debug)]
pub struct NginxDjangoArgs {
    /// Environment the site runs in, e.g. "production" or "test"
    pub environment: String,

    /// Name of the Django project (the package containing wsgi.py)
    pub project: String,

    /// Domain nginx serves the site for, e.g. "www.example.com"
    pub domain: String,

    /// Folder the project is deployed to
    #[arg(long, default_value = "/var/www/${environment}/${project}")]
    pub project_dir: String,

    /// User gunicorn runs as
    #[arg(long, default_value = "www-data")]
    pub user: String,

    /// Group gunicorn runs as
    #[arg(long, default_value = "www-data")]
    pub group: String,
}

impl TemplateFamily for NginxDjangoArgs {
    fn name(&self) -> &'static str {
        "nginx-django"
    }

    fn arguments(&self) -> Vec<(&'static str, String)> {
        vec![
            ("environment", self.environment.clone()),
            ("project", self.project.clone()),
            ("domain", self.domain.clone()),
            ("project-dir", self.project_dir.clone()),
            ("user", self.user.clone()),
            ("group", self.group.clone()),
        ]
    }

    fn symbols_to_resolve(&self) -> &'static [&'static str] {
        &["project_dir"]
    }
}
