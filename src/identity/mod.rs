use fake::faker::internet::en::SafeEmail;
use fake::Fake;

/// Synthetic user identity for the register / forgot-password /
/// reset-password chain. Generated once per scenario execution.
#[derive(Debug, Clone)]
pub struct Identity {
    pub email: String,
    pub password: String,
}

/// Source of synthetic identities
///
/// Kept behind a trait so the runner can be driven with a deterministic
/// fixture instead of random data.
pub trait IdentityGenerator: Send + Sync {
    fn generate(&self) -> Identity;
}

/// Faker-backed generator. The password reuses the email string, matching
/// the minimal-entropy convention of the reset-token stand-in.
pub struct FakerIdentityGenerator;

impl IdentityGenerator for FakerIdentityGenerator {
    fn generate(&self) -> Identity {
        // Faker emails alone can collide across runs; salt the local part
        // so register never hits a previously created account.
        let email: String = SafeEmail().fake();
        let email = format!("{:08x}.{}", rand::random::<u32>(), email);

        Identity {
            password: email.clone(),
            email,
        }
    }
}

/// Fixed generator for tests
pub struct FixedIdentityGenerator {
    pub email: String,
    pub password: String,
}

impl IdentityGenerator for FixedIdentityGenerator {
    fn generate(&self) -> Identity {
        Identity {
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_email_is_well_formed() {
        let identity = FakerIdentityGenerator.generate();
        let at = identity.email.find('@').expect("email has an @");
        assert!(at > 0);
        assert!(identity.email[at + 1..].contains('.'));
        assert!(!identity.email.contains(char::is_whitespace));
    }

    #[test]
    fn test_password_reuses_email() {
        let identity = FakerIdentityGenerator.generate();
        assert_eq!(identity.email, identity.password);
    }

    #[test]
    fn test_consecutive_identities_are_distinct() {
        let generator = FakerIdentityGenerator;
        let first = generator.generate();
        let second = generator.generate();
        assert_ne!(first.email, second.email);
    }

    #[test]
    fn test_fixed_generator_is_deterministic() {
        let generator = FixedIdentityGenerator {
            email: "probe@example.com".to_string(),
            password: "probe@example.com".to_string(),
        };
        assert_eq!(generator.generate().email, generator.generate().email);
    }
}
