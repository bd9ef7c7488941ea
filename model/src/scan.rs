use anyhow::Result;

use network::{Driver, DriverID, Network};

const PREFIX: &str = "DRIVER-";

/// Parses the contents of a driver's QR code, like `DRIVER-3`.
pub fn parse_driver_code(code: &str) -> Result<DriverID> {
    let code = code.trim();
    if code.is_empty() {
        bail!("Enter or scan a driver code");
    }
    let number = match code.strip_prefix(PREFIX) {
        Some(x) => x,
        None => bail!("{code} isn't a driver code. They look like {PREFIX}1"),
    };
    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
        bail!("{code} isn't a driver code. They look like {PREFIX}1");
    }
    let id = number
        .parse::<usize>()
        .map_err(|err| anyhow!("{code}: {err}"))?;
    Ok(DriverID(id))
}

pub fn lookup_driver<'a>(network: &'a Network, code: &str) -> Result<&'a Driver> {
    let id = parse_driver_code(code)?;
    network
        .drivers
        .get(&id)
        .ok_or_else(|| anyhow!("No driver is registered under {}", code.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsing() {
        assert_eq!(parse_driver_code("DRIVER-1").unwrap(), DriverID(1));
        assert_eq!(parse_driver_code("  DRIVER-42\n").unwrap(), DriverID(42));
        assert!(parse_driver_code("").is_err());
        assert!(parse_driver_code("   ").is_err());
        assert!(parse_driver_code("DRIVER-").is_err());
        assert!(parse_driver_code("DRIVER-x1").is_err());
        assert!(parse_driver_code("DRIVER--1").is_err());
        assert!(parse_driver_code("driver-1").is_err());
        assert!(parse_driver_code("PASSENGER-1").is_err());
        assert!(parse_driver_code("DRIVER-99999999999999999999999").is_err());
    }

    #[test]
    fn lookup() {
        let network = Network::load_embedded().unwrap();
        assert_eq!(lookup_driver(&network, "DRIVER-2").unwrap().name, "Maria Santos");
        let err = lookup_driver(&network, "DRIVER-77").unwrap_err();
        assert!(err.to_string().contains("DRIVER-77"));

        for driver in network.drivers.values() {
            assert_eq!(lookup_driver(&network, &driver.qr_code()).unwrap().id, driver.id);
        }
    }
}
