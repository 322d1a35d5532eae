use serde::Deserialize;
use tributary_remote::RepoRef;

/// Path parameters for `/api/repos/{owner}/{name}` routes.
#[derive(Debug, Deserialize)]
pub struct RepoPath {
    pub owner: String,
    pub name: String,
}

impl RepoPath {
    /// Checks that neither segment is blank.
    pub fn validate(&self) -> Result<(), String> {
        if self.owner.trim().is_empty() {
            return Err("Repository owner cannot be empty".to_string());
        }
        if self.name.trim().is_empty() {
            return Err("Repository name cannot be empty".to_string());
        }
        Ok(())
    }

    /// Returns the validated repository reference.
    pub fn repo_ref(&self) -> Result<RepoRef, String> {
        self.validate()?;
        Ok(RepoRef::new(self.owner.trim(), self.name.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_ref() {
        let path = RepoPath {
            owner: "octocat".into(),
            name: "hello".into(),
        };
        assert_eq!(path.repo_ref().unwrap(), RepoRef::new("octocat", "hello"));
    }

    #[test]
    fn test_blank_segments_rejected() {
        let path = RepoPath {
            owner: " ".into(),
            name: "hello".into(),
        };
        assert!(path.validate().is_err());
    }
}
