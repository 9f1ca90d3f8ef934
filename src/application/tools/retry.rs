//! Exponential-backoff retry wrapper rendered as a bash script.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::ToolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_secs: u64,
    pub factor: u32,
    pub max_delay_secs: u64,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_secs: 1,
            factor: 2,
            max_delay_secs: 60,
            jitter: false,
        }
    }
}

impl RetryPolicy {
    pub fn validate(&self) -> Result<(), ToolError> {
        if !(1..=100).contains(&self.max_attempts) {
            return Err(ToolError::invalid("max_attempts", "must be between 1 and 100"));
        }
        if self.base_delay_secs == 0 {
            return Err(ToolError::invalid("base_delay", "must be at least one second"));
        }
        if self.factor == 0 {
            return Err(ToolError::invalid("factor", "must be at least 1"));
        }
        if self.max_delay_secs < self.base_delay_secs {
            return Err(ToolError::invalid(
                "max_delay",
                format!("must not be below the base delay of {}s", self.base_delay_secs),
            ));
        }
        Ok(())
    }

    /// Wait before each retry: `base * factor^(n-1)`, capped at `max_delay`.
    pub fn delays(&self) -> Result<Vec<u64>, ToolError> {
        self.validate()?;
        let mut delays = Vec::with_capacity(self.max_attempts.saturating_sub(1) as usize);
        let mut delay = self.base_delay_secs;
        for _ in 1..self.max_attempts {
            delays.push(delay.min(self.max_delay_secs));
            delay = delay
                .saturating_mul(u64::from(self.factor))
                .min(self.max_delay_secs);
        }
        Ok(delays)
    }

    pub fn worst_case_wait(&self) -> Result<u64, ToolError> {
        Ok(self.delays()?.iter().sum())
    }
}

pub fn render_script(command: &str, policy: &RetryPolicy) -> Result<String, ToolError> {
    policy.validate()?;
    let command = command.trim();
    if command.is_empty() {
        return Err(ToolError::invalid("command", "must not be empty"));
    }
    if command.contains('\n') {
        return Err(ToolError::invalid("command", "must be a single line"));
    }

    let mut script = String::new();
    script.push_str("#!/usr/bin/env bash\n");
    let _ = writeln!(
        script,
        "# Retries the command up to {} times with exponential backoff.",
        policy.max_attempts
    );
    script.push_str("set -u\n\n");
    let _ = writeln!(script, "max_attempts={}", policy.max_attempts);
    let _ = writeln!(script, "delay={}", policy.base_delay_secs);
    let _ = writeln!(script, "factor={}", policy.factor);
    let _ = writeln!(script, "max_delay={}", policy.max_delay_secs);
    script.push_str("attempt=1\n\n");
    let _ = writeln!(script, "until {command}; do");
    script.push_str("  if [ \"$attempt\" -ge \"$max_attempts\" ]; then\n");
    script.push_str("    echo \"giving up after $attempt attempts\" >&2\n");
    script.push_str("    exit 1\n");
    script.push_str("  fi\n");
    if policy.jitter {
        script.push_str("  wait_for=$(( delay + RANDOM % (delay + 1) ))\n");
    } else {
        script.push_str("  wait_for=$delay\n");
    }
    script.push_str("  echo \"attempt $attempt failed; retrying in ${wait_for}s\" >&2\n");
    script.push_str("  sleep \"$wait_for\"\n");
    script.push_str("  attempt=$(( attempt + 1 ))\n");
    script.push_str("  delay=$(( delay * factor ))\n");
    script.push_str("  if [ \"$delay\" -gt \"$max_delay\" ]; then\n");
    script.push_str("    delay=$max_delay\n");
    script.push_str("  fi\n");
    script.push_str("done\n");
    Ok(script)
}
