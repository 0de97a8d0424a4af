use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use argh::FromArgs;
use gbxlib::format::{challenge::ChallengeMap, gbx::GbxDocument};

#[derive(FromArgs, PartialEq, Debug)]
/// process map (CGameCtnChallenge) files
#[argh(subcommand, name = "map")]
pub struct Args {
    #[argh(subcommand)]
    command: SubCommand,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand)]
enum SubCommand {
    Thumbnail(ThumbnailArgs),
    Author(AuthorArgs),
}

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// exports the map thumbnail
#[argh(subcommand, name = "thumbnail")]
pub struct ThumbnailArgs {
    #[argh(positional)]
    /// input map
    input: PathBuf,
    #[argh(option, short = 'o')]
    /// output image (default: input with .png extension)
    output: Option<PathBuf>,
}

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// prints or edits the map author information
#[argh(subcommand, name = "author")]
pub struct AuthorArgs {
    #[argh(positional)]
    /// input map
    input: PathBuf,
    #[argh(option)]
    /// new author login
    login: Option<String>,
    #[argh(option)]
    /// new author nickname
    nickname: Option<String>,
    #[argh(option)]
    /// new author zone
    zone: Option<String>,
    #[argh(option)]
    /// new extra info
    extra_info: Option<String>,
    #[argh(option, short = 'o')]
    /// output map (default: overwrite input)
    output: Option<PathBuf>,
}

pub fn run(args: Args) -> Result<()> {
    match args.command {
        SubCommand::Thumbnail(c_args) => thumbnail(c_args),
        SubCommand::Author(c_args) => author(c_args),
    }
}

fn thumbnail(args: ThumbnailArgs) -> Result<()> {
    let mut doc = GbxDocument::read_file(&args.input)?;
    let map = ChallengeMap::new(&mut doc)?;
    let image = map
        .thumbnail_image()?
        .ok_or_else(|| anyhow!("Map '{}' has no thumbnail", args.input.display()))?;
    log::info!("Thumbnail: {}x{}", image.width(), image.height());

    let path = args.output.unwrap_or_else(|| args.input.with_extension("png"));
    log::info!("Writing {}", path.display());
    image
        .save(&path)
        .with_context(|| format!("Failed to write image '{}'", path.display()))?;
    Ok(())
}

fn author(args: AuthorArgs) -> Result<()> {
    let mut doc = GbxDocument::read_file(&args.input)?;
    let mut map = ChallengeMap::new(&mut doc)?;

    let edits = [&args.login, &args.nickname, &args.zone, &args.extra_info];
    if edits.iter().all(|v| v.is_none()) {
        let author = map
            .author()?
            .ok_or_else(|| anyhow!("Map '{}' has no author information", args.input.display()))?;
        log::info!("Author info:");
        log::info!("  Map info version: {}", author.map_info_version);
        log::info!("  Author version: {}", author.author_version);
        log::info!("  Login: {}", author.login);
        log::info!("  Nickname: {}", author.nickname);
        log::info!("  Zone: {}", author.zone);
        log::info!("  Extra info: {}", author.extra_info);
        if let Some(xml) = map.xml()? {
            log::info!("XML: {xml}");
        }
        return Ok(());
    }

    let Some(author) = map.author_mut()? else {
        return Err(anyhow!("Map '{}' has no author information", args.input.display()));
    };
    if let Some(login) = args.login {
        author.login = login;
    }
    if let Some(nickname) = args.nickname {
        author.nickname = nickname;
    }
    if let Some(zone) = args.zone {
        author.zone = zone;
    }
    if let Some(extra_info) = args.extra_info {
        author.extra_info = extra_info;
    }
    map.save()?;

    let path = args.output.unwrap_or(args.input);
    log::info!("Writing {}", path.display());
    doc.write_file(&path)?;
    Ok(())
}
