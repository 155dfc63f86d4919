//! Resolve run options with the precedence flag > prompt > default.

use crate::error::Error;
use crate::model::{Credentials, Location, Method, MAX_CONNECTIONS};
use crate::prompt::{ask_line, Prompter};
use anyhow::Result;

const DEFAULT_CONNECTIONS: u8 = 1;

pub async fn connection_count<P: Prompter>(flag: Option<u8>, prompter: &mut P) -> Result<u8> {
    if let Some(n) = flag {
        return validate_count(&n.to_string());
    }
    let answer = ask_line(
        prompter,
        "Enter the number of VPN connections you want to establish: ",
    )
    .await?;
    if answer.trim().is_empty() {
        return Ok(DEFAULT_CONNECTIONS);
    }
    validate_count(&answer)
}

fn validate_count(raw: &str) -> Result<u8> {
    match raw.trim().parse::<u8>() {
        Ok(n) if (1..=MAX_CONNECTIONS).contains(&n) => Ok(n),
        _ => Err(Error::InvalidConnectionCount(raw.trim().to_string()).into()),
    }
}

pub async fn method<P: Prompter>(flag: Option<Method>, prompter: &mut P) -> Result<Method> {
    if let Some(m) = flag {
        return Ok(m);
    }
    let answer = ask_line(
        prompter,
        "Which VPN connection method do you want to use?\n1. Gluetun\n2. OpenVPN Proxy\nEnter your choice (1 or 2): ",
    )
    .await?;
    if answer.trim().is_empty() {
        return Ok(Method::Gluetun);
    }
    Method::parse_answer(&answer).ok_or_else(|| Error::InvalidMethod(answer.trim().into()).into())
}

/// One location per slot. A flag list is padded with `any` or truncated to `count`.
pub async fn locations<P: Prompter>(
    flag: &[String],
    count: u8,
    prompter: &mut P,
) -> Result<Vec<Location>> {
    let count = usize::from(count);
    if !flag.is_empty() {
        if flag.len() > count {
            tracing::warn!(
                given = flag.len(),
                used = count,
                "more server locations than connections; ignoring the rest"
            );
        }
        let mut out: Vec<Location> = flag.iter().take(count).map(|s| Location::parse(s)).collect();
        out.resize(count, Location::Any);
        return Ok(out);
    }

    println!("You can specify server locations (e.g., 'us', 'de', 'fr').");
    println!("Leave blank to connect to any available server.");
    let mut out = Vec::with_capacity(count);
    for i in 1..=count {
        let answer = ask_line(
            prompter,
            &format!("Enter desired server location for connection {i}: "),
        )
        .await?;
        out.push(Location::parse(&answer));
    }
    Ok(out)
}

/// Credentials for a new credentials file, kept exactly as typed. Blank values are passed
/// through; the credentials module decides whether they are acceptable.
pub async fn credentials<P: Prompter>(
    username: Option<&str>,
    password: Option<&str>,
    prompter: &mut P,
) -> Result<Credentials> {
    let username = match username.filter(|s| !s.is_empty()) {
        Some(u) => u.to_string(),
        None => ask_line(prompter, "Enter your VPN (OpenVPN) username: ").await?,
    };
    let password = match password.filter(|s| !s.is_empty()) {
        Some(p) => p.to_string(),
        None => ask_line(prompter, "Enter your VPN (OpenVPN) password: ").await?,
    };
    Ok(Credentials { username, password })
}

/// Yes/no question. Only `y`/`yes` count as yes; anything else (including blank) is no.
pub async fn confirm<P: Prompter>(
    flag: Option<bool>,
    question: &str,
    prompter: &mut P,
) -> Result<bool> {
    if let Some(b) = flag {
        return Ok(b);
    }
    let answer = ask_line(prompter, question).await?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
