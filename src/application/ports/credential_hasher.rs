/// One-way password digest. Implementations must salt each digest.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> anyhow::Result<String>;
    /// Returns false for a mismatch and for a digest that cannot be parsed.
    fn verify(&self, password: &str, digest: &str) -> bool;
}
