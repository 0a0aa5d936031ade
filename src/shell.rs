//! Interactive dispatcher console
//!
//! One command per line on stdin; every command maps to a handler event.

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::handlers::{Driver, Event, Notice, NoticeLevel};
use crate::services::overlay::MapSurface;
use crate::types::{parse_polygon, BusId};

pub const HELP: &str = "\
Commands:
  load                              load all stops of the data set
  optimize                          request a fresh solution
  show                              redraw and list the current routes
  edit <bus>                        start editing a route
  remove <index>                    remove the stop at <index> from the edited route
  insert <stopId> before <anchorId> insert a stop before another one
  commit | cancel                   end the edit session
  lock <bus> | unlock <bus>         lock a route as shown / release it
  visible <bus|all> on|off          show or hide route paths
  finalize                          re-optimize around the locked routes
  apply                             submit locked routes for server validation
  polygon <lat,lng;lat,lng;...>     add a polygon
  polygons                          list drawn polygons
  clear-polygons                    remove every polygon
  inside                            list stops inside the first polygon
  help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Event(Event),
    Help,
    Quit,
    Empty,
}

impl Command {
    /// Commands that are only meaningful during an edit session
    fn needs_session(&self) -> bool {
        matches!(
            self,
            Command::Event(
                Event::RemoveStop { .. } | Event::InsertStop { .. } | Event::CommitEdit | Event::CancelEdit
            )
        )
    }
}

fn parse_bus(arg: Option<&str>) -> Result<BusId, String> {
    let arg = arg.ok_or("missing bus number")?;
    arg.parse().map_err(|_| format!("invalid bus number '{}'", arg))
}

fn parse_switch(arg: Option<&str>) -> Result<bool, String> {
    match arg {
        Some("on") => Ok(true),
        Some("off") => Ok(false),
        other => Err(format!("expected 'on' or 'off', got '{}'", other.unwrap_or(""))),
    }
}

/// Parse one input line
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let mut args = rest.split_whitespace();

    let event = match word {
        "" => return Ok(Command::Empty),
        "help" | "?" => return Ok(Command::Help),
        "quit" | "exit" => return Ok(Command::Quit),
        "load" => Event::LoadStops,
        "optimize" => Event::Optimize,
        "show" => Event::ShowSolution,
        "edit" => Event::StartEdit {
            bus_id: parse_bus(args.next())?,
        },
        "remove" => {
            let arg = args.next().ok_or("missing stop index")?;
            let index = arg.parse().map_err(|_| format!("invalid stop index '{}'", arg))?;
            Event::RemoveStop { index }
        }
        "insert" => match (args.next(), args.next(), args.next()) {
            (Some(stop_id), Some("before"), Some(before_stop_id)) => Event::InsertStop {
                stop_id: stop_id.to_string(),
                before_stop_id: before_stop_id.to_string(),
            },
            _ => return Err("usage: insert <stopId> before <anchorId>".to_string()),
        },
        "commit" => Event::CommitEdit,
        "cancel" => Event::CancelEdit,
        "lock" | "unlock" => Event::ToggleLock {
            bus_id: parse_bus(args.next())?,
            locked: word == "lock",
        },
        "visible" => {
            let target = args.next();
            let bus_id = match target {
                Some("all") => None,
                other => Some(parse_bus(other)?),
            };
            Event::SetRouteVisible {
                bus_id,
                visible: parse_switch(args.next())?,
            }
        }
        "finalize" => Event::Finalize,
        "apply" => Event::SubmitEdits,
        "polygon" => Event::PolygonDrawn(parse_polygon(rest)?),
        "polygons" => Event::DescribePolygons,
        "clear-polygons" => Event::ClearPolygons,
        "inside" => Event::ListPolygonStops,
        other => return Err(format!("unknown command '{}' (try 'help')", other)),
    };
    Ok(Command::Event(event))
}

pub fn print_notice(notice: &Notice) {
    match notice.level {
        NoticeLevel::Info => println!("{}", notice),
        NoticeLevel::Warning | NoticeLevel::Error => eprintln!("{}", notice),
    }
}

/// Read commands from stdin until `quit` or end of input
pub async fn run<M: MapSurface>(driver: &mut Driver<M>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("Bus route desk. Type 'help' for commands.");

    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("error: {}", e);
                continue;
            }
        };

        if command.needs_session() && !driver.context().editor.is_editing() {
            warn!("Ignoring '{}': no active edit session", line.trim());
            eprintln!("warning: no route is being edited");
            continue;
        }

        match command {
            Command::Empty => {}
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
            Command::Event(event) => {
                for notice in driver.handle(event).await {
                    print_notice(&notice);
                }
            }
        }
    }

    info!("Shell closed");
    Ok(())
}
