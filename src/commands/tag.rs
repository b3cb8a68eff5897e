use crate::hub::Listing;
use crate::hub::model::tag::Tag;
use crate::hub::repositories::split_reference;
use crate::model::arg::TagCommand;

use super::{Context, format};

pub(super) async fn run(command: TagCommand, ctx: &Context) -> anyhow::Result<()> {
    match command {
        TagCommand::Ls {
            repository,
            pages,
            sort,
            output,
        } => {
            let ordering = sort_ordering(sort.as_deref().unwrap_or_default())?;
            let client = ctx.authenticated().await?;
            let listing = client
                .get_tags(&repository, ordering, pages.all)
                .await?;
            print!(
                "{}",
                format::output(output.format, listing.items.as_slice(), |_| render(&listing))?
            );
            Ok(())
        }
        TagCommand::Rm { reference, force } => {
            let (repository, tag) = split_reference(&reference);
            let Some(tag) = tag else {
                anyhow::bail!("invalid reference {:?}: tag must be specified", reference);
            };
            let client = ctx.authenticated().await?;

            println!(
                "WARNING: You are about to permanently delete image \"{}:{}\"",
                repository, tag
            );
            println!("         This action is irreversible");
            let prompt = format!(
                "Are you sure you want to delete the image tagged {:?} from repository {:?}? [y/N] ",
                tag, repository
            );
            if !ctx.confirm(force.force, &prompt).await? {
                return Ok(());
            }

            match client.remove_tag(&repository, &tag).await {
                Ok(()) => println!("Deleted {}:{}", repository, tag),
                Err(e) if e.is_not_found() => println!("Not Found {}:{}", repository, tag),
                Err(e) => return Err(e.into()),
            }
            Ok(())
        }
    }
}

/// Map `--sort <column>[=asc|desc]` to the server `ordering` parameter
///
/// Ascending by name is `-name` on the server side.
fn sort_ordering(sort: &str) -> anyhow::Result<Option<&'static str>> {
    if sort.is_empty() {
        return Ok(None);
    }

    let (column, direction) = match sort.split_once('=') {
        Some((column, direction)) => (column, direction),
        None => (sort, "asc"),
    };
    let descending = match direction {
        "asc" => false,
        "desc" => true,
        other => anyhow::bail!(
            "invalid sorting direction {:?}: should be either \"asc\" or \"desc\"",
            other
        ),
    };

    match (column, descending) {
        ("name", false) => Ok(Some("-name")),
        ("name", true) => Ok(Some("name")),
        ("updated", false) => Ok(Some("last_updated")),
        ("updated", true) => Ok(Some("-last_updated")),
        (other, _) => anyhow::bail!(
            "unknown sorting column {:?}: should be either \"name\" or \"updated\"",
            other
        ),
    }
}

fn render(listing: &Listing<Tag>) -> String {
    let mut out = String::from("TAG\tDIGEST\tSTATUS\tLAST UPDATE\tLAST PUSHED\tLAST PULLED\tSIZE\n");
    for tag in &listing.items {
        let digest = match tag.images.as_slice() {
            [image] => image.digest.as_str(),
            _ => "",
        };
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
            tag.name,
            digest,
            tag.status,
            format::time(tag.last_updated),
            format::time(tag.last_pushed),
            format::time(tag.last_pulled),
            format::size(tag.full_size)
        ));
    }
    if let Some(footer) = format::partial_footer(listing, "tags") {
        out.push_str(&footer);
        out.push('\n');
    }
    out
}
