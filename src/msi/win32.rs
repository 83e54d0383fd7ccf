//! Windows Installer database bindings.
//!
//! Every MSI handle is wrapped in [`MsiHandle`], which closes it on drop, so
//! early returns release the record, view and database handles in reverse
//! order of acquisition.

use std::path::Path;

use tracing::{debug, warn};
use windows::Win32::System::ApplicationInstallationAndServicing::{
    MSIDBOPEN_READONLY, MSIHANDLE, MsiCloseHandle, MsiDatabaseOpenViewW, MsiOpenDatabaseW,
    MsiRecordGetStringW, MsiViewExecute, MsiViewFetch,
};
use windows::core::{HSTRING, PWSTR};

use super::{
    PRODUCT_CODE, PRODUCT_VERSION, ProductMetadata, VALUE_BUFFER_LEN, decode_wide,
    property_query,
};
use crate::error::{MetadataError, QueryStage};

const ERROR_SUCCESS: u32 = 0;
const ERROR_MORE_DATA: u32 = 234;
const ERROR_NO_MORE_ITEMS: u32 = 259;

/// Owned MSI handle
struct MsiHandle(MSIHANDLE);

impl Drop for MsiHandle {
    fn drop(&mut self) {
        // SAFETY: the handle came from a successful Msi* call and is closed once.
        let code = unsafe { MsiCloseHandle(self.0) };
        if code != ERROR_SUCCESS {
            warn!("MsiCloseHandle failed with code {}", code);
        }
    }
}

pub(super) fn read_product_metadata(msi_path: &Path) -> Result<ProductMetadata, MetadataError> {
    let database = open_database(msi_path)?;
    let product_code = read_property(&database, PRODUCT_CODE)?;
    let product_version = read_property(&database, PRODUCT_VERSION)?;

    debug!(
        "Read {}={} {}={} from {}",
        PRODUCT_CODE,
        product_code,
        PRODUCT_VERSION,
        product_version,
        msi_path.display()
    );

    Ok(ProductMetadata {
        product_code,
        product_version,
    })
}

fn open_database(msi_path: &Path) -> Result<MsiHandle, MetadataError> {
    let path = HSTRING::from(msi_path.as_os_str());
    let mut handle = MSIHANDLE::default();

    // SAFETY: `path` outlives the call and `handle` is a valid out pointer.
    let code = unsafe { MsiOpenDatabaseW(&path, MSIDBOPEN_READONLY, &mut handle) };
    if code != ERROR_SUCCESS {
        return Err(MetadataError::Open {
            path: msi_path.to_path_buf(),
            code,
        });
    }

    Ok(MsiHandle(handle))
}

fn read_property(database: &MsiHandle, property: &str) -> Result<String, MetadataError> {
    let failed = |stage, code| MetadataError::Query {
        property: property.to_string(),
        stage,
        code,
    };

    let query = HSTRING::from(property_query(property));
    let mut view = MSIHANDLE::default();
    // SAFETY: `query` outlives the call and `view` is a valid out pointer.
    let code = unsafe { MsiDatabaseOpenViewW(database.0, &query, &mut view) };
    if code != ERROR_SUCCESS {
        return Err(failed(QueryStage::OpenView, code));
    }
    let view = MsiHandle(view);

    // SAFETY: `view` is open; a null record means no query parameters.
    let code = unsafe { MsiViewExecute(view.0, MSIHANDLE::default()) };
    if code != ERROR_SUCCESS {
        return Err(failed(QueryStage::Execute, code));
    }

    let mut record = MSIHANDLE::default();
    // SAFETY: `view` has been executed and `record` is a valid out pointer.
    let code = unsafe { MsiViewFetch(view.0, &mut record) };
    if code == ERROR_NO_MORE_ITEMS {
        return Err(MetadataError::MissingProperty(property.to_string()));
    }
    if code != ERROR_SUCCESS {
        return Err(failed(QueryStage::Fetch, code));
    }
    let record = MsiHandle(record);

    let mut buf = [0u16; VALUE_BUFFER_LEN];
    let mut len = buf.len() as u32;
    // SAFETY: `buf` holds `len` UTF-16 units and both pointers outlive the call.
    let code = unsafe {
        MsiRecordGetStringW(
            record.0,
            1,
            PWSTR(buf.as_mut_ptr()),
            Some(&mut len as *mut u32),
        )
    };
    match code {
        ERROR_SUCCESS => {}
        ERROR_MORE_DATA => {
            debug!(
                "{} needs {} characters, keeping the first {}",
                property,
                len,
                VALUE_BUFFER_LEN - 1
            );
        }
        code => return Err(failed(QueryStage::ReadValue, code)),
    }

    Ok(decode_wide(&buf))
}
