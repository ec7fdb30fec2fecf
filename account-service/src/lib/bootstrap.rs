use crate::config::SeedAccountConfig;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::SecondaryId;
use crate::domain::user::models::SeedUserCommand;
use crate::user::errors::UserError;
use crate::user::ports::UserServicePort;

impl TryFrom<&SeedAccountConfig> for SeedUserCommand {
    type Error = UserError;

    fn try_from(account: &SeedAccountConfig) -> Result<Self, Self::Error> {
        Ok(SeedUserCommand {
            email: EmailAddress::new(account.email.clone())?,
            password: account.password.clone(),
            name: account.name.clone(),
            id_troy: SecondaryId::new(account.id_troy.clone())?,
            role: account.role.parse()?,
        })
    }
}

/// Create every configured seed account that does not exist yet.
///
/// Seed accounts skip the email flow and are stored already verified.
/// Returns how many accounts were created.
pub async fn seed_accounts<US: UserServicePort>(
    user_service: &US,
    accounts: &[SeedAccountConfig],
) -> Result<usize, UserError> {
    let mut created = 0;

    for account in accounts {
        let command = SeedUserCommand::try_from(account)?;

        match user_service.seed_user(command).await? {
            Some(_) => created += 1,
            None => tracing::debug!(email = %account.email, "Seed account already present"),
        }
    }

    Ok(created)
}
