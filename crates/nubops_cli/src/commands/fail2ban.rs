//! fail2ban command - Protect ssh against brute force logins.

use clap::Args;

use super::TemplateFamily;

#[derive(Args, Debug)]
pub struct Fail2banArgs {
    /// Addresses that are never banned, separated by spaces
    #[arg(long, default_value = "127.0.0.1/8 ::1")]
    pub ignore_ip: String,

    /// How long an address stays banned
    #[arg(long, default_value = "1h")]
    pub bantime: String,

    /// Time window failed logins are counted in
    #[arg(long, default_value = "10m")]
    pub findtime: String,

    /// Failed logins within the window before an address is banned
    #[arg(long, default_value = "5")]
    pub maxretry: u32,
}

impl TemplateFamily for Fail2banArgs {
    fn name(&self) -> &'static str {
        "fail2ban"
    }

    fn arguments(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ignore-ip", self.ignore_ip.clone()),
            ("bantime", self.bantime.clone()),
            ("findtime", self.findtime.clone()),
            ("maxretry", self.maxretry.to_string()),
        ]
    }
}
