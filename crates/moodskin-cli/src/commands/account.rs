use anyhow::{Result, bail};
use colored::Colorize;
use moodskin_core::identity::SignInMethod;

use super::context::Context;
use crate::LoginArgs;

/// Maps login flags to a sign-in method.
pub(crate) fn sign_in_method(args: &LoginArgs) -> Result<SignInMethod> {
    if args.anonymous {
        return Ok(SignInMethod::Anonymous);
    }
    match (&args.email, &args.password, &args.provider, &args.token) {
        (Some(email), Some(password), _, _) => Ok(SignInMethod::Password {
            email: email.clone(),
            password: password.clone(),
        }),
        (_, _, Some(provider), Some(token)) => Ok(SignInMethod::Federated {
            provider: provider.clone(),
            token: token.clone(),
        }),
        _ => bail!("Use --anonymous, --email with --password, or --provider with --token"),
    }
}

pub async fn login(ctx: &Context, args: &LoginArgs) -> Result<()> {
    let method = sign_in_method(args)?;
    let session = ctx.app.sign_in(method).await?;
    println!(
        "{} {}",
        "Signed in as".green(),
        session.display_name().bold()
    );
    let count = ctx.app.saved().await.len();
    if count > 0 {
        println!("{count} saved theme(s) restored.");
    }
    Ok(())
}

pub async fn logout(ctx: &Context) -> Result<()> {
    ctx.app.sign_out().await?;
    println!("{}", "Signed out.".green());
    Ok(())
}

pub async fn whoami(ctx: &Context) -> Result<()> {
    match ctx.app.whoami().await {
        Some(session) => {
            let kind = if session.is_guest() { "guest" } else { "registered" };
            println!("{} ({kind})", session.display_name().bold());
            println!("  {} {}", "key".dimmed(), session.key);
            if let Some(email) = &session.profile.email {
                println!("  {} {}", "email".dimmed(), email);
            }
        }
        None => println!("{}", "Not signed in.".yellow()),
    }
    println!("  {} {}", "data".dimmed(), ctx.paths.data_dir().display());
    Ok(())
}
