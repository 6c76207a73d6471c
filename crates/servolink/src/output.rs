use std::io::IsTerminal;
use std::net::SocketAddr;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use servolink_frame::{catalog, commands, to_hex, DecodedReply, Frame, Header};
use servolink_transport::TransportKind;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Where a request went and how it was framed.
pub struct Exchange<'a> {
    pub peer: Option<SocketAddr>,
    pub transport: TransportKind,
    pub sent: &'a Frame,
    pub reply: &'a DecodedReply,
}

#[derive(Serialize)]
struct ReplyOutput<'a> {
    peer: String,
    transport: &'static str,
    sent: String,
    protocol: &'static str,
    sequence: u8,
    command: u8,
    command_name: &'a str,
    status_code: u8,
    status: &'static str,
    ok: bool,
    body: String,
}

impl<'a> ReplyOutput<'a> {
    fn from_exchange(exchange: &Exchange<'a>) -> Self {
        let reply = exchange.reply;
        Self {
            peer: exchange
                .peer
                .map(|addr| addr.to_string())
                .unwrap_or_default(),
            transport: exchange.transport.as_str(),
            sent: exchange.sent.to_string(),
            protocol: protocol_name(reply.header),
            sequence: reply.sequence,
            command: reply.command,
            command_name: reply.command_name,
            status_code: reply.status_code,
            status: reply.status.name(),
            ok: reply.is_ok(),
            body: to_hex(&reply.body),
        }
    }
}

pub fn print_reply(exchange: &Exchange<'_>, format: OutputFormat) {
    let out = ReplyOutput::from_exchange(exchange);
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["COMMAND", "SEQ", "STATUS", "CODE", "BODY"])
                .add_row(vec![
                    format!("{} (0x{:02X})", out.command_name, out.command),
                    out.sequence.to_string(),
                    out.status.to_string(),
                    format!("0x{:02X}", out.status_code),
                    body_preview(&exchange.reply.body),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("sent  {} -> {} ({})", out.sent, out.peer, out.transport);
            println!(
                "reply {} seq={} status={} (0x{:02X}) body={}",
                out.command_name,
                out.sequence,
                out.status,
                out.status_code,
                body_preview(&exchange.reply.body)
            );
        }
        OutputFormat::Raw => {
            println!("{}", to_hex(&exchange.reply.raw));
        }
    }
}

#[derive(Serialize)]
struct CommandRow {
    id: u8,
    name: &'static str,
    slug: &'static str,
    payload: String,
}

pub fn print_commands(format: OutputFormat) {
    let rows: Vec<CommandRow> = commands()
        .iter()
        .map(|spec| CommandRow {
            id: spec.id,
            name: spec.name,
            slug: spec.slug,
            payload: spec.rule.to_string(),
        })
        .collect();

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&rows).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ID", "COMMAND", "NAME", "PAYLOAD"]);
            for row in &rows {
                table.add_row(vec![
                    format!("0x{:02X}", row.id),
                    row.slug.to_string(),
                    row.name.to_string(),
                    row.payload.clone(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for row in &rows {
                println!(
                    "0x{:02X}  {:<16} {:<26} {}",
                    row.id, row.slug, row.name, row.payload
                );
            }
        }
    }
}

#[derive(Serialize)]
struct CodeRow {
    code: u8,
    name: &'static str,
}

pub fn print_codes(format: OutputFormat) {
    let rows: Vec<CodeRow> = catalog()
        .map(|(code, status)| CodeRow {
            code,
            name: status.name(),
        })
        .collect();

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&rows).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CODE", "STATUS"]);
            for row in &rows {
                table.add_row(vec![format!("0x{:02X}", row.code), row.name.to_string()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for row in &rows {
                println!("0x{:02X}  {}", row.code, row.name);
            }
        }
    }
}

fn protocol_name(header: u8) -> &'static str {
    match Header::from_byte(header) {
        Ok(Header::Vendor) => "vendor",
        Ok(Header::User) => "user",
        Err(_) => "unknown",
    }
}

/// Info replies carry ASCII text; anything else is shown as hex.
fn body_preview(body: &[u8]) -> String {
    if body.is_empty() {
        return "-".to_string();
    }
    match std::str::from_utf8(body) {
        Ok(text) if text.chars().all(|c| !c.is_control()) => text.to_string(),
        _ => to_hex(body),
    }
}
