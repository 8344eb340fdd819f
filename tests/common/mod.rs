#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use docker_image_builder::{CommandRunner, DockerGateway, EngineOutput, Logger};
use serde_json::json;

#[derive(Debug, Clone)]
pub struct FakeContainer {
    pub id: String,
    pub name: String,
    pub image: String,
}

#[derive(Default)]
struct State {
    images: Vec<(String, String, String)>,
    containers: Vec<FakeContainer>,
    calls: Vec<Vec<String>>,
    failing: HashSet<String>,
    exec_outputs: HashMap<String, String>,
    next_id: u64,
}

/// In-memory docker: keeps an image and container inventory, records every
/// call and answers the subset of the CLI the gateway uses.
#[derive(Default)]
pub struct FakeEngine {
    state: Mutex<State>,
}

impl FakeEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_image(&self, reference: &str) {
        let (repo, tag) = reference.rsplit_once(':').unwrap_or((reference, "latest"));
        let mut s = self.state.lock().unwrap();
        s.next_id += 1;
        let id = format!("sha256:{:012x}", s.next_id);
        s.images.push((repo.to_string(), tag.to_string(), id));
    }

    /// Add a container directly (duplicate names allowed). Returns its id.
    pub fn add_container(&self, name: &str, image: &str) -> String {
        let mut s = self.state.lock().unwrap();
        s.next_id += 1;
        let id = format!("c{:011x}", s.next_id);
        s.containers.push(FakeContainer {
            id: id.clone(),
            name: name.to_string(),
            image: image.to_string(),
        });
        id
    }

    /// Make every call with this verb (`run`, `commit`, `exec`, ...) fail.
    pub fn fail_on(&self, verb: &str) {
        self.state.lock().unwrap().failing.insert(verb.to_string());
    }

    /// Canned stdout for `exec <container> <args joined by space>`.
    pub fn exec_output(&self, command: &str, stdout: &str) {
        self.state
            .lock()
            .unwrap()
            .exec_outputs
            .insert(command.to_string(), stdout.to_string());
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn calls_with(&self, verb: &str) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|c| c.first().map(String::as_str) == Some(verb))
            .collect()
    }

    /// Verbs of mutating calls in order (listings left out).
    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| c.first().cloned())
            .filter(|v| v != "images" && v != "ps")
            .collect()
    }

    pub fn containers(&self) -> Vec<FakeContainer> {
        self.state.lock().unwrap().containers.clone()
    }

    pub fn container_names(&self) -> Vec<String> {
        self.containers().into_iter().map(|c| c.name).collect()
    }

    pub fn image_refs(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .images
            .iter()
            .map(|(r, t, _)| format!("{r}:{t}"))
            .collect()
    }
}

fn find<'a>(containers: &'a [FakeContainer], key: &str) -> Option<&'a FakeContainer> {
    containers.iter().find(|c| c.id == key || c.name == key)
}

impl CommandRunner for FakeEngine {
    fn run(&self, args: &[String]) -> anyhow::Result<EngineOutput> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(args.to_vec());
        let verb = args.first().cloned().unwrap_or_default();
        if s.failing.contains(&verb) {
            return Ok(EngineOutput::failed(format!("{verb}: simulated failure")));
        }

        let out = match verb.as_str() {
            "images" => EngineOutput::ok(
                s.images
                    .iter()
                    .map(|(repo, tag, id)| {
                        json!({
                            "ID": id, "Repository": repo, "Tag": tag,
                            "Size": "7.8MB", "CreatedAt": "2024-01-01 00:00:00 +0000 UTC"
                        })
                        .to_string()
                    })
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            "ps" => EngineOutput::ok(
                s.containers
                    .iter()
                    .map(|c| {
                        json!({
                            "ID": c.id, "Names": c.name, "Image": c.image,
                            "Status": "Up 1 second", "Labels": "", "Mounts": "",
                            "Ports": "", "Command": "\"/bin/sh -c 'tail -f /dev/null'\"",
                            "CreatedAt": "2024-01-01 00:00:00 +0000 UTC",
                            "Networks": "bridge", "RunningFor": "1 second ago"
                        })
                        .to_string()
                    })
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            "run" => {
                let name = args
                    .iter()
                    .find_map(|a| a.strip_prefix("--name="))
                    .unwrap_or_default()
                    .to_string();
                let mut rest = args[1..].iter();
                let mut image = String::new();
                while let Some(a) = rest.next() {
                    match a.as_str() {
                        "-d" => {}
                        "-v" => {
                            rest.next();
                        }
                        a if a.starts_with("--name=") => {}
                        a => {
                            image = a.to_string();
                            break;
                        }
                    }
                }
                if s.containers.iter().any(|c| c.name == name) {
                    EngineOutput::failed(format!("Conflict. The container name \"/{name}\" is already in use"))
                } else {
                    s.next_id += 1;
                    let id = format!("c{:011x}", s.next_id);
                    s.containers.push(FakeContainer {
                        id: id.clone(),
                        name,
                        image,
                    });
                    EngineOutput::ok(format!("{id}\n"))
                }
            }
            "stop" => {
                let missing = args[1..].iter().any(|k| find(&s.containers, k).is_none());
                if missing {
                    EngineOutput::failed("Error response from daemon: No such container")
                } else {
                    EngineOutput::ok(args[1..].join("\n"))
                }
            }
            "rm" => {
                let mut missing = false;
                for k in &args[1..] {
                    match s.containers.iter().position(|c| c.id == *k || c.name == *k) {
                        Some(i) => {
                            s.containers.remove(i);
                        }
                        None => missing = true,
                    }
                }
                if missing {
                    EngineOutput::failed("Error response from daemon: No such container")
                } else {
                    EngineOutput::ok(args[1..].join("\n"))
                }
            }
            "exec" => {
                let target = args.get(1).cloned().unwrap_or_default();
                if find(&s.containers, &target).is_none() {
                    EngineOutput::failed(format!("Error: No such container: {target}"))
                } else {
                    let key = args[2..].join(" ");
                    EngineOutput::ok(s.exec_outputs.get(&key).cloned().unwrap_or_default())
                }
            }
            "commit" => {
                let container = args.get(1).cloned().unwrap_or_default();
                let target = args.get(2).cloned().unwrap_or_default();
                if find(&s.containers, &container).is_none() {
                    EngineOutput::failed(format!("Error: No such container: {container}"))
                } else {
                    let (repo, tag) = target
                        .rsplit_once(':')
                        .unwrap_or((target.as_str(), "latest"));
                    let (repo, tag) = (repo.to_string(), tag.to_string());
                    s.next_id += 1;
                    let id = format!("sha256:{:012x}", s.next_id);
                    s.images.push((repo, tag, id.clone()));
                    EngineOutput::ok(format!("{id}\n"))
                }
            }
            "cp" => {
                let side = args[1..]
                    .iter()
                    .find_map(|a| a.split_once(':').map(|(c, _)| c.to_string()));
                match side {
                    Some(c) if find(&s.containers, &c).is_some() => EngineOutput::ok(""),
                    _ => EngineOutput::failed("Error: No such container"),
                }
            }
            "inspect" => {
                let target = args.last().cloned().unwrap_or_default();
                if find(&s.containers, &target).is_none() {
                    EngineOutput::failed(format!("Error: No such object: {target}"))
                } else if args.iter().any(|a| a.starts_with("--format=")) {
                    EngineOutput::ok("running\n")
                } else {
                    EngineOutput::ok(format!("[{{\"Name\": \"/{target}\"}}]\n"))
                }
            }
            other => EngineOutput::failed(format!("unknown command: {other}")),
        };
        Ok(out)
    }
}

pub fn gateway(engine: &Arc<FakeEngine>) -> DockerGateway {
    DockerGateway::new(engine.clone(), &Logger::disabled())
}
