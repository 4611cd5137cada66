//! AbuseIPDB report categories.

use std::fmt;
use std::str::FromStr;

/// Abuse category codes accepted by the report endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AbuseCategory {
    DnsCompromise = 1,
    DnsPoisoning = 2,
    FraudOrders = 3,
    DdosAttack = 4,
    FtpBruteForce = 5,
    PingOfDeath = 6,
    Phishing = 7,
    FraudVoip = 8,
    OpenProxy = 9,
    WebSpam = 10,
    EmailSpam = 11,
    BlogSpam = 12,
    VpnIp = 13,
    PortScan = 14,
    Hacking = 15,
    SqlInjection = 16,
    Spoofing = 17,
    BruteForce = 18,
    BadWebBot = 19,
    ExploitedHost = 20,
    WebAppAttack = 21,
    Ssh = 22,
    IotTargeted = 23,
}

const ALL: [AbuseCategory; 23] = [
    AbuseCategory::DnsCompromise,
    AbuseCategory::DnsPoisoning,
    AbuseCategory::FraudOrders,
    AbuseCategory::DdosAttack,
    AbuseCategory::FtpBruteForce,
    AbuseCategory::PingOfDeath,
    AbuseCategory::Phishing,
    AbuseCategory::FraudVoip,
    AbuseCategory::OpenProxy,
    AbuseCategory::WebSpam,
    AbuseCategory::EmailSpam,
    AbuseCategory::BlogSpam,
    AbuseCategory::VpnIp,
    AbuseCategory::PortScan,
    AbuseCategory::Hacking,
    AbuseCategory::SqlInjection,
    AbuseCategory::Spoofing,
    AbuseCategory::BruteForce,
    AbuseCategory::BadWebBot,
    AbuseCategory::ExploitedHost,
    AbuseCategory::WebAppAttack,
    AbuseCategory::Ssh,
    AbuseCategory::IotTargeted,
];

impl AbuseCategory {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        ALL.iter().copied().find(|c| c.code() == code)
    }

    /// Kebab-case name, e.g. `brute-force`.
    pub fn name(self) -> &'static str {
        match self {
            AbuseCategory::DnsCompromise => "dns-compromise",
            AbuseCategory::DnsPoisoning => "dns-poisoning",
            AbuseCategory::FraudOrders => "fraud-orders",
            AbuseCategory::DdosAttack => "ddos-attack",
            AbuseCategory::FtpBruteForce => "ftp-brute-force",
            AbuseCategory::PingOfDeath => "ping-of-death",
            AbuseCategory::Phishing => "phishing",
            AbuseCategory::FraudVoip => "fraud-voip",
            AbuseCategory::OpenProxy => "open-proxy",
            AbuseCategory::WebSpam => "web-spam",
            AbuseCategory::EmailSpam => "email-spam",
            AbuseCategory::BlogSpam => "blog-spam",
            AbuseCategory::VpnIp => "vpn-ip",
            AbuseCategory::PortScan => "port-scan",
            AbuseCategory::Hacking => "hacking",
            AbuseCategory::SqlInjection => "sql-injection",
            AbuseCategory::Spoofing => "spoofing",
            AbuseCategory::BruteForce => "brute-force",
            AbuseCategory::BadWebBot => "bad-web-bot",
            AbuseCategory::ExploitedHost => "exploited-host",
            AbuseCategory::WebAppAttack => "web-app-attack",
            AbuseCategory::Ssh => "ssh",
            AbuseCategory::IotTargeted => "iot-targeted",
        }
    }
}

impl fmt::Display for AbuseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for AbuseCategory {
    type Err = String;

    /// Accepts a numeric code (`18`) or a name (`brute-force`, `Brute_Force`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<u8>() {
            return Self::from_code(code).ok_or_else(|| format!("unknown category code: {code}"));
        }

        let name = s.to_ascii_lowercase().replace('_', "-");
        ALL.iter()
            .copied()
            .find(|c| c.name() == name)
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

/// Encode category codes the way the report endpoint expects: `18,20`.
pub fn encode_categories(codes: &[u8]) -> String {
    codes
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for category in ALL {
            assert_eq!(AbuseCategory::from_code(category.code()), Some(category));
        }
        assert_eq!(AbuseCategory::from_code(0), None);
        assert_eq!(AbuseCategory::from_code(24), None);
    }

    #[test]
    fn test_parse_by_code_and_name() {
        assert_eq!("18".parse::<AbuseCategory>(), Ok(AbuseCategory::BruteForce));
        assert_eq!("ssh".parse::<AbuseCategory>(), Ok(AbuseCategory::Ssh));
        assert_eq!(
            "Web_App_Attack".parse::<AbuseCategory>(),
            Ok(AbuseCategory::WebAppAttack)
        );
        assert!("99".parse::<AbuseCategory>().is_err());
        assert!("spam".parse::<AbuseCategory>().is_err());
    }

    #[test]
    fn test_encode_categories() {
        assert_eq!(encode_categories(&[18, 20]), "18,20");
        assert_eq!(encode_categories(&[22]), "22");
    }
}
