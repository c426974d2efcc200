//! Active Directory connection using Windows ADSI
//!
//! Binds to the domain with the current Windows user's credentials via
//! ADSI (Active Directory Service Interfaces). Credentials and server
//! selection are left to Windows.

use crate::error::{AppError, AppResult};

#[cfg(windows)]
use windows::{
    core::{BSTR, Interface, PCWSTR, VARIANT},
    Win32::Networking::ActiveDirectory::*,
    Win32::System::Com::*,
};

/// HRESULT returned by CoInitializeEx when the thread already uses another
/// apartment model
#[cfg(windows)]
const RPC_E_CHANGED_MODE: u32 = 0x8001_0106;

/// Active Directory connection handle
pub struct AdConnection {
    pub domain_dn: String,
    #[cfg(windows)]
    _com_initialized: bool,
}

impl AdConnection {
    /// Connect to Active Directory using current Windows credentials
    #[cfg(windows)]
    pub fn connect() -> AppResult<Self> {
        unsafe {
            let com_initialized = ensure_com_initialized()?;

            // RootDSE tells us which domain we are in
            let root_dse_path = BSTR::from("LDAP://RootDSE");
            let mut root_dse: Option<IADs> = None;

            ADsOpenObject(
                PCWSTR(root_dse_path.as_ptr()),
                PCWSTR::null(),
                PCWSTR::null(),
                ADS_SECURE_AUTHENTICATION,
                &<IADs as Interface>::IID,
                &mut root_dse as *mut _ as *mut *mut std::ffi::c_void,
            )
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to bind to RootDSE");
                AppError::BulkLookup(format!("Failed to connect to AD: {}", e))
            })?;

            let root_dse = root_dse.ok_or(AppError::NotConnected)?;

            let domain_dn = Self::get_ads_property(&root_dse, "defaultNamingContext")?;
            if domain_dn.is_empty() {
                return Err(AppError::NotConnected);
            }

            tracing::info!(domain_dn = %domain_dn, "AD connection established");

            Ok(Self {
                domain_dn,
                _com_initialized: com_initialized,
            })
        }
    }

    /// Non-Windows fallback - returns error
    #[cfg(not(windows))]
    pub fn connect() -> AppResult<Self> {
        tracing::error!("Active Directory access requires Windows ADSI");
        Err(AppError::NotConnected)
    }

    /// Get a string property from an IADs object
    #[cfg(windows)]
    unsafe fn get_ads_property(ads: &IADs, property: &str) -> AppResult<String> {
        let prop_name = BSTR::from(property);
        let value = ads
            .Get(&prop_name)
            .map_err(|e| AppError::BulkLookup(format!("Failed to get {}: {}", property, e)))?;

        Ok(variant_to_string(&value))
    }
}

/// Convert a BSTR VARIANT to String; other variant types yield an empty string
#[cfg(windows)]
fn variant_to_string(var: &VARIANT) -> String {
    BSTR::try_from(var)
        .map(|b| b.to_string())
        .unwrap_or_default()
}

/// Initialize COM for the current thread.
///
/// Already-initialized threads (S_FALSE or a different apartment model)
/// are fine for ADSI. Returns whether this call took a COM reference that
/// must be released with `CoUninitialize`.
#[cfg(windows)]
pub(crate) unsafe fn ensure_com_initialized() -> AppResult<bool> {
    let hr = CoInitializeEx(None, COINIT_APARTMENTTHREADED);
    if hr.is_ok() {
        Ok(true)
    } else if hr.0 as u32 == RPC_E_CHANGED_MODE {
        Ok(false)
    } else {
        Err(AppError::WindowsError(format!(
            "COM initialization failed: HRESULT 0x{:08X}",
            hr.0 as u32
        )))
    }
}

#[cfg(windows)]
impl Drop for AdConnection {
    fn drop(&mut self) {
        if self._com_initialized {
            unsafe {
                CoUninitialize();
            }
        }
    }
}

#[cfg(all(test, not(windows)))]
mod tests {
    use super::*;

    #[test]
    fn test_connect_fails_without_adsi() {
        assert!(matches!(AdConnection::connect(), Err(AppError::NotConnected)));
    }
}
