use crate::hub::Listing;
use crate::hub::model::repository::Repository;
use crate::hub::repositories::repository_path;
use crate::model::arg::RepoCommand;

use super::{Context, format};

pub(super) async fn run(command: RepoCommand, ctx: &Context) -> anyhow::Result<()> {
    match command {
        RepoCommand::Ls {
            account,
            pages,
            output,
        } => {
            let client = ctx.authenticated().await?;
            let listing = client
                .get_repositories(account.as_deref().unwrap_or_default(), pages.all)
                .await?;
            print!(
                "{}",
                format::output(output.format, listing.items.as_slice(), |_| render(&listing))?
            );
            Ok(())
        }
        RepoCommand::Rm { repository, force } => {
            let client = ctx.authenticated().await?;
            let name = repository_path(&repository);
            if !force.force {
                let tags = client.get_tags(&name, None, false).await?;
                println!(
                    "WARNING: You are about to permanently delete repository {:?} including {} tag(s)",
                    name, tags.total
                );
                println!("         This action is irreversible");
                println!("Enter the name of the repository to confirm deletion: {}", name);
                let answer = ctx.terminal.read_line("").await?;
                if !confirms_deletion(&answer, &name) {
                    anyhow::bail!("{:?} differs from your repository name, deletion aborted", answer);
                }
            }
            client.remove_repository(&name).await?;
            println!("Deleted {}", name);
            Ok(())
        }
    }
}

/// Deletion goes ahead only when the full `namespace/name` is typed back
fn confirms_deletion(answer: &str, name: &str) -> bool {
    answer.trim().to_lowercase() == name
}

fn render(listing: &Listing<Repository>) -> String {
    let mut out = String::from("REPOSITORY\tDESCRIPTION\tLAST UPDATE\tPULLS\tSTARS\tPRIVATE\n");
    for repo in &listing.items {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\t{}\n",
            repo.name,
            repo.description,
            format::time(repo.last_updated),
            repo.pull_count,
            repo.star_count,
            repo.is_private
        ));
    }
    if let Some(footer) = format::partial_footer(listing, "repositories") {
        out.push_str(&footer);
        out.push('\n');
    }
    out
}
