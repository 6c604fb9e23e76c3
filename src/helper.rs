use log::debug;
use rand::Rng;

use crate::{Result, TickError};

const ID_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generates a random alphanumeric identifier of the given length.
///
/// Collisions are accepted as negligible at the target scale and are not
/// checked.
pub fn generate_id(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let index = rng.gen_range(0..ID_CHARSET.len());
            ID_CHARSET[index] as char
        })
        .collect()
}

/// Formats a duration in seconds as `HH:MM:SS`, flooring fractional seconds.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    format!("{:02}:{:02}:{:02}", h, m, s)
}

/// Parses a duration entered by the user, either `HH:MM:SS` or a plain
/// number of seconds.
pub fn parse_duration(input: &str) -> Result<f64> {
    let trimmed = input.trim();

    if trimmed.contains(':') {
        let parts: Vec<&str> = trimmed.split(':').collect();
        if parts.len() != 3 {
            return Err(TickError::InvalidDuration {
                input: input.to_string(),
            });
        }

        let mut fields = [0u64; 3];
        for (slot, part) in fields.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| TickError::InvalidDuration {
                input: input.to_string(),
            })?;
        }

        // Minutes and seconds above 59 are rejected rather than carried
        if fields[1] > 59 || fields[2] > 59 {
            return Err(TickError::InvalidDuration {
                input: input.to_string(),
            });
        }

        let seconds = fields[0] * 3600 + fields[1] * 60 + fields[2];
        debug!("Parsed duration '{}' as {} seconds", trimmed, seconds);
        return Ok(seconds as f64);
    }

    let seconds: f64 = trimmed.parse().map_err(|_| TickError::InvalidDuration {
        input: input.to_string(),
    })?;

    if seconds < 0.0 || !seconds.is_finite() {
        return Err(TickError::InvalidDuration {
            input: input.to_string(),
        });
    }

    Ok(seconds)
}
