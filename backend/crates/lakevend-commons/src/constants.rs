//! Well-known names and limits of the credential-vending flow.

/// Constants shared by the vendor, the configuration layer and the sandbox.
pub struct VendingConstants;

impl VendingConstants {
    /// Session tag key the grantee role's trust policy checks before it lets
    /// the coordinating identity assume it.
    pub const DEFAULT_SESSION_TAG_KEY: &'static str = "LakeFormationAuthorizedCaller";

    /// Default lifetime of vended table credentials (1 hour).
    pub const DEFAULT_CREDENTIAL_DURATION_SECS: u32 = 3600;

    /// Shortest lifetime the permissions service accepts (15 minutes).
    pub const MIN_CREDENTIAL_DURATION_SECS: u32 = 900;

    /// Longest lifetime the permissions service accepts (12 hours).
    pub const MAX_CREDENTIAL_DURATION_SECS: u32 = 43_200;

    /// Catalog parameter holding the file format of a table.
    pub const CLASSIFICATION_PARAMETER: &'static str = "classification";
}
