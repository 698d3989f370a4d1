//! Command-line argument definitions (clap).

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "fandash")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Console dashboard for fan-control backends", long_about = None)]
pub struct Args {
    // === Connection ===
    /// Backend base URL, e.g. http://192.168.1.20:5002 (overrides the config file)
    #[arg(short = 'u', long = "base-url", value_name = "URL", help_heading = "Connection")]
    pub base_url: Option<String>,

    /// Path to the configuration file (defaults to fandash.json next to the binary)
    #[arg(short = 'c', long, value_name = "PATH", help_heading = "Connection")]
    pub config: Option<String>,

    // === Dashboard ===
    /// Start with the raw-payload debug view open (SIGUSR1 toggles it at runtime)
    #[arg(short = 'd', long, help_heading = "Dashboard")]
    pub debug: bool,

    /// Apply one PWM value (0-255) and exit instead of running the dashboard
    #[arg(long = "apply-pwm", value_name = "VALUE", help_heading = "Dashboard")]
    pub apply_pwm: Option<String>,

    // === Config & Debug ===
    /// Set log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(long = "log-level", value_name = "LEVEL", help_heading = "Config & Debug")]
    pub log_level: Option<String>,

    /// Print the effective configuration and exit
    #[arg(long = "show-config", help_heading = "Config & Debug")]
    pub show_config: bool,

    /// Write the effective configuration to the config file and exit
    #[arg(long = "write-config", help_heading = "Config & Debug")]
    pub write_config: bool,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn defaults_run_the_dashboard() {
        let args = Args::parse_from(["fandash"]);
        assert!(args.base_url.is_none());
        assert!(args.config.is_none());
        assert!(!args.debug);
        assert!(args.apply_pwm.is_none());
        assert!(!args.show_config);
    }

    #[test]
    fn apply_pwm_keeps_the_raw_argument() {
        let args = Args::parse_from(["fandash", "--apply-pwm", "3.5"]);
        assert_eq!(args.apply_pwm.as_deref(), Some("3.5"));
    }

    #[test]
    fn overrides_parse_together() {
        let args = Args::parse_from([
            "fandash",
            "-u",
            "http://fan.local:5002",
            "-c",
            "/etc/fandash.json",
            "-d",
            "--log-level",
            "DEBUG",
        ]);
        assert_eq!(args.base_url.as_deref(), Some("http://fan.local:5002"));
        assert_eq!(args.config.as_deref(), Some("/etc/fandash.json"));
        assert!(args.debug);
        assert_eq!(args.log_level.as_deref(), Some("DEBUG"));
    }
}
