use anyhow::anyhow;
use std::str::FromStr;

///
/// User events read from stdin, one per line
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Click on the bell
    Toggle,
    /// Click outside of the panel
    Close,
    Click(String),
    ReadAll,
    Refresh,
    Login(String),
    Logout,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let name = words.next().ok_or(anyhow!("empty command"))?;
        let argument = words.next();

        let command = match (name, argument) {
            ("toggle", None) => Self::Toggle,
            ("close", None) => Self::Close,
            ("click", Some(id)) => Self::Click(id.to_string()),
            ("read-all", None) => Self::ReadAll,
            ("refresh", None) => Self::Refresh,
            ("login", Some(token)) => Self::Login(token.to_string()),
            ("logout", None) => Self::Logout,
            ("quit", None) => Self::Quit,
            ("click" | "login", None) => return Err(anyhow!("{name} requires an argument")),
            _ => return Err(anyhow!("unknown command: {s}")),
        };

        if words.next().is_some() {
            return Err(anyhow!("too many arguments: {s}"));
        }

        Ok(command)
    }
}
