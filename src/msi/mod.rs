//! MSI product metadata.
//!
//! The wizard needs two properties from an MSI database: `ProductCode` (the
//! uninstall and detection key) and `ProductVersion`. Reading them goes
//! through the Windows Installer API, which only exists on Windows, so the
//! rest of the crate talks to the narrow [`MetadataSource`] trait instead.
//!
//! Extraction failures are never fatal: the package is still built, just
//! without a detection rule.

#[cfg(windows)]
mod win32;

use std::path::Path;

use crate::error::MetadataError;

/// Property holding the product GUID
pub const PRODUCT_CODE: &str = "ProductCode";

/// Property holding the product version
pub const PRODUCT_VERSION: &str = "ProductVersion";

/// Capacity (UTF-16 units) of the value buffer; longer values are truncated.
/// A braced GUID is 38 characters plus the terminator.
pub const VALUE_BUFFER_LEN: usize = 39;

/// The two properties read from an MSI
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductMetadata {
    pub product_code: String,
    pub product_version: String,
}

/// Anything that can read product metadata from an installer file
pub trait MetadataSource {
    /// Read `ProductCode` and `ProductVersion` from the MSI at `msi_path`
    fn product_metadata(&self, msi_path: &Path) -> Result<ProductMetadata, MetadataError>;
}

/// Metadata source backed by the operating system's installer service
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsInstaller;

impl MetadataSource for WindowsInstaller {
    #[cfg(windows)]
    fn product_metadata(&self, msi_path: &Path) -> Result<ProductMetadata, MetadataError> {
        win32::read_product_metadata(msi_path)
    }

    #[cfg(not(windows))]
    fn product_metadata(&self, msi_path: &Path) -> Result<ProductMetadata, MetadataError> {
        tracing::debug!(
            "Skipping MSI metadata for {}: not running on Windows",
            msi_path.display()
        );
        Err(MetadataError::Unsupported)
    }
}

/// SQL used to read a single row of the `Property` table
pub fn property_query(property: &str) -> String {
    format!("SELECT `Value` FROM `Property` WHERE `Property` = '{property}'")
}

/// Decode a NUL-terminated UTF-16 buffer
pub fn decode_wide(buf: &[u16]) -> String {
    let end = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..end])
}
