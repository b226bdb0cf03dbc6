use std::path::PathBuf;

/// Which blob backend to use and how to address it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobBackendConfig {
    Local {
        /// Directory holding the blob files.
        root: PathBuf,
        /// Prefix of the references handed out, e.g. `/files`.
        public_base_url: String,
    },
    S3 {
        bucket: String,
        /// Key prefix inside the bucket (may be empty).
        prefix: String,
        /// Prefix of the references handed out.
        public_base_url: String,
    },
}

impl BlobBackendConfig {
    /// Load the blob backend configuration from environment variables.
    ///
    /// | Env Var                | Default                               |
    /// |------------------------|---------------------------------------|
    /// | `BLOB_BACKEND`         | `local` (`local` or `s3`)             |
    /// | `BLOB_LOCAL_ROOT`      | `storage/blobs`                       |
    /// | `BLOB_PUBLIC_BASE_URL` | `/files`                              |
    /// | `S3_BUCKET`            | required when `BLOB_BACKEND=s3`       |
    /// | `S3_PREFIX`            | `assets`                              |
    /// | `S3_PUBLIC_BASE_URL`   | `https://{S3_BUCKET}.s3.amazonaws.com`|
    pub fn from_env() -> Self {
        let backend = std::env::var("BLOB_BACKEND").unwrap_or_else(|_| "local".into());

        match backend.trim().to_ascii_lowercase().as_str() {
            "s3" => {
                let bucket = std::env::var("S3_BUCKET")
                    .expect("S3_BUCKET must be set when BLOB_BACKEND=s3");
                let prefix = std::env::var("S3_PREFIX")
                    .unwrap_or_else(|_| "assets".into())
                    .trim_matches('/')
                    .to_string();
                let public_base_url = std::env::var("S3_PUBLIC_BASE_URL")
                    .unwrap_or_else(|_| format!("https://{bucket}.s3.amazonaws.com"));
                Self::S3 {
                    bucket,
                    prefix,
                    public_base_url: trim_base(&public_base_url),
                }
            }
            "local" => {
                let root = std::env::var("BLOB_LOCAL_ROOT")
                    .unwrap_or_else(|_| "storage/blobs".into())
                    .into();
                let public_base_url =
                    std::env::var("BLOB_PUBLIC_BASE_URL").unwrap_or_else(|_| "/files".into());
                Self::Local {
                    root,
                    public_base_url: trim_base(&public_base_url),
                }
            }
            other => panic!("BLOB_BACKEND must be 'local' or 's3', got '{other}'"),
        }
    }
}

fn trim_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
