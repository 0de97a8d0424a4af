use std::{io::stdout, path::PathBuf};

use anyhow::{bail, Result};
use argh::FromArgs;
use gbxlib::format::{
    body::BodySizes,
    dump_gbx,
    gbx::GbxDocument,
    header::{Compression, HeaderFlags},
};
use serde_derive::Serialize;

#[derive(FromArgs, PartialEq, Debug)]
/// process GBX containers
#[argh(subcommand, name = "gbx")]
pub struct Args {
    #[argh(subcommand)]
    command: SubCommand,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand)]
enum SubCommand {
    Info(InfoArgs),
    Repack(RepackArgs),
}

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// print container information
#[argh(subcommand, name = "info")]
pub struct InfoArgs {
    #[argh(positional)]
    /// input GBX
    input: PathBuf,
    #[argh(switch)]
    /// print JSON instead of text
    json: bool,
}

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// rewrite a GBX file, optionally changing body compression
#[argh(subcommand, name = "repack")]
pub struct RepackArgs {
    #[argh(positional)]
    /// input GBX
    input: PathBuf,
    #[argh(positional)]
    /// output GBX
    output: PathBuf,
    #[argh(switch, short = 'c')]
    /// compress the body
    compress: bool,
    #[argh(switch, short = 'u')]
    /// decompress the body
    uncompress: bool,
}

#[derive(Serialize)]
struct ChunkSummary {
    id: u32,
    len: usize,
    heavy: bool,
}

#[derive(Serialize)]
struct DocumentSummary {
    version: u16,
    flags: Option<HeaderFlags>,
    class_id: Option<u32>,
    user_data_size: Option<u32>,
    header_chunks: Vec<ChunkSummary>,
    node_count: u32,
    external_node_count: u32,
    body_sizes: Option<BodySizes>,
    body_len: usize,
}

impl DocumentSummary {
    fn new(doc: &GbxDocument) -> Self {
        let header = &doc.header;
        Self {
            version: header.version,
            flags: header.flags,
            class_id: header.class_id,
            user_data_size: header.user_data.as_ref().map(|u| u.declared_size),
            header_chunks: header
                .chunks()
                .iter()
                .map(|c| ChunkSummary { id: c.id, len: c.len(), heavy: c.heavy })
                .collect(),
            node_count: header.node_count,
            external_node_count: doc.ref_table.external_node_count,
            body_sizes: doc.body.sizes(),
            body_len: doc.body.data().len(),
        }
    }
}

pub fn run(args: Args) -> Result<()> {
    match args.command {
        SubCommand::Info(c_args) => info(c_args),
        SubCommand::Repack(c_args) => repack(c_args),
    }
}

fn info(args: InfoArgs) -> Result<()> {
    let doc = GbxDocument::read_file(&args.input)?;
    if args.json {
        serde_json::to_writer_pretty(stdout(), &DocumentSummary::new(&doc))?;
        println!();
    } else {
        dump_gbx(&mut stdout(), &doc)?;
    }
    Ok(())
}

fn repack(args: RepackArgs) -> Result<()> {
    if args.compress && args.uncompress {
        bail!("--compress and --uncompress are mutually exclusive");
    }
    let mut doc = GbxDocument::read_file(&args.input)?;
    if args.compress {
        doc.set_body_compression(Compression::Compressed)?;
    } else if args.uncompress {
        doc.set_body_compression(Compression::Uncompressed)?;
    }
    log::info!(
        "Writing {} ({} body)",
        args.output.display(),
        if doc.header.body_compressed() { "compressed" } else { "uncompressed" }
    );
    doc.write_file(&args.output)?;
    Ok(())
}
