mod commands;

use clap::{Parser, Subcommand};
use commands::{auth, serve};

#[derive(Parser)]
#[command(name = "latchkey")]
#[command(version, about = "Credentials sign-in and session tokens over HTTP")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (configuration is read from the environment)
    Serve {
        /// Host to bind the server to (overrides HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind the server to (overrides PORT)
        #[arg(long, short)]
        port: Option<u16>,

        /// Seed the in-memory user store with EMAIL:HASH (repeatable, ignored with DATABASE_URL)
        #[arg(long = "user", value_name = "EMAIL:HASH")]
        users: Vec<String>,
    },

    /// Authentication tooling
    Auth {
        #[command(subcommand)]
        auth_command: AuthCommands,
    },
}

#[derive(Subcommand)]
enum AuthCommands {
    /// Hash a password for the users table
    HashPassword {
        password: String,

        /// Hashing algorithm (bcrypt, argon2)
        #[arg(long, default_value = "bcrypt")]
        algorithm: String,

        /// bcrypt cost factor
        #[arg(long)]
        cost: Option<u32>,
    },

    /// Generate a value for AUTH_SECRET
    GenerateSecret {
        /// Secret length in characters
        #[arg(long, default_value = "64")]
        length: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port, users } => {
            serve::run(serve::ServeArgs { host, port, users }).await?;
        }
        Commands::Auth { auth_command } => match auth_command {
            AuthCommands::HashPassword {
                password,
                algorithm,
                cost,
            } => {
                println!("{}", auth::hash_password(&password, &algorithm, cost)?);
            }
            AuthCommands::GenerateSecret { length } => {
                println!("{}", auth::generate_secret(length));
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::try_parse_from(["latchkey", "serve", "--port", "8080"]).unwrap();
        match cli.command {
            Commands::Serve { host, port, users } => {
                assert_eq!(host, None);
                assert_eq!(port, Some(8080));
                assert!(users.is_empty());
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_serve_seed_users() {
        let cli = Cli::try_parse_from([
            "latchkey",
            "serve",
            "--user",
            "a@b.com:$2b$04$abc",
            "--user",
            "c@d.com:$2b$04$def",
        ])
        .unwrap();
        match cli.command {
            Commands::Serve { users, .. } => assert_eq!(users, ["a@b.com:$2b$04$abc", "c@d.com:$2b$04$def"]),
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_auth_subcommands() {
        let cli = Cli::try_parse_from(["latchkey", "auth", "hash-password", "s3cret", "--algorithm", "argon2"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Auth {
                auth_command: AuthCommands::HashPassword { ref algorithm, .. }
            } if algorithm == "argon2"
        ));

        let cli = Cli::try_parse_from(["latchkey", "auth", "generate-secret"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Auth {
                auth_command: AuthCommands::GenerateSecret { length: 64 }
            }
        ));
    }
}
