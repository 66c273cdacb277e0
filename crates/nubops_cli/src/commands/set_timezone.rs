//! set-timezone command - Set the system timezone.

use clap::Args;

use super::TemplateFamily;

#[derive(Args, Debug)]
pub struct SetTimezoneArgs {
    /// Timezone name, e.g. "Europe/Vienna" or "UTC"
    pub timezone: String,
}

impl TemplateFamily for SetTimezoneArgs {
    fn name(&self) -> &'static str {
        "set-timezone"
    }

    fn arguments(&self) -> Vec<(&'static str, String)> {
        vec![("timezone", self.timezone.clone())]
    }
}
