//! Application services orchestrating repositories, the secret store,
//! and remote SSH access.

pub mod connections;
pub mod nodes;
pub mod remote;

pub use connections::{ConnectionService, ProvisionedConnection};
pub use nodes::NodeService;
pub use remote::RemoteAccessService;

use crate::error::{Error, Result};

/// Largest page size the list operations accept.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Validate 1-based pagination parameters.
pub(crate) fn check_pagination(page: u64, size: u64) -> Result<()> {
    if page == 0 {
        return Err(Error::InvalidInput("page must be at least 1".to_string()));
    }
    if size == 0 || size > MAX_PAGE_SIZE {
        return Err(Error::InvalidInput(format!(
            "size must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_bounds() {
        assert!(check_pagination(1, 1).is_ok());
        assert!(check_pagination(10, 100).is_ok());
        assert!(check_pagination(0, 10).is_err());
        assert!(check_pagination(1, 0).is_err());
        assert!(check_pagination(1, 101).is_err());
    }
}
