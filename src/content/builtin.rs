//! Built-in training content

use super::{Briefing, Catalog};
use crate::data::*;
use std::collections::BTreeMap;

fn text(value: &str) -> PayloadValue {
    PayloadValue::Text(value.to_string())
}

fn list(values: &[&str]) -> PayloadValue {
    PayloadValue::List(values.iter().map(|v| v.to_string()).collect())
}

fn payload(entries: Vec<(&str, PayloadValue)>) -> Payload {
    entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

#[allow(clippy::too_many_arguments)]
fn step(
    id: u32,
    title: &str,
    description: &str,
    tool: Tool,
    action: ActionKind,
    expected_result: &str,
    success: &str,
    failure: &str,
    payload: Payload,
) -> ScenarioStep {
    ScenarioStep {
        id,
        title: title.to_string(),
        description: description.to_string(),
        tool,
        action,
        expected_result: expected_result.to_string(),
        feedback: Feedback {
            success: success.to_string(),
            failure: failure.to_string(),
        },
        payload,
        next_step: None,
    }
}

fn choice(id: &str, prompt: &str, choices: &[&str], answer: usize, explanation: &str) -> Question {
    Question {
        id: id.to_string(),
        prompt: prompt.to_string(),
        explanation: explanation.to_string(),
        kind: QuestionKind::MultipleChoice {
            choices: choices.iter().map(|c| c.to_string()).collect(),
            answer,
        },
    }
}

fn true_false(id: &str, prompt: &str, answer: bool, explanation: &str) -> Question {
    Question {
        id: id.to_string(),
        prompt: prompt.to_string(),
        explanation: explanation.to_string(),
        kind: QuestionKind::TrueFalse { answer },
    }
}

fn free_text(id: &str, prompt: &str, accepted: &[&str], explanation: &str) -> Question {
    Question {
        id: id.to_string(),
        prompt: prompt.to_string(),
        explanation: explanation.to_string(),
        kind: QuestionKind::FreeText {
            accepted: accepted.iter().map(|a| a.to_string()).collect(),
        },
    }
}

pub fn briefing() -> Briefing {
    Briefing {
        title: "Operation Night Shift".to_string(),
        story: vec![
            "Welcome to the Security Operations Center, recruit.".to_string(),
            "Attackers do not keep office hours. Tonight you join the response team on the night shift."
                .to_string(),
            "Before we hand you the consoles, prove you know the basics in a short knowledge check."
                .to_string(),
            "Then pick a course and work real incidents through our SIEM, EDR, threat intel and SOAR tools."
                .to_string(),
        ],
        objectives: vec![
            "Pass the knowledge check".to_string(),
            "Triage and contain each incident before the clock runs out".to_string(),
            "Use the right console for every action".to_string(),
        ],
    }
}

pub fn quiz() -> Vec<Question> {
    vec![
        choice(
            "mc-phish-sign",
            "Which of these is the strongest sign that an email is a phishing attempt?",
            &[
                "It was sent on a Monday",
                "The sender domain is one letter off from your supplier's",
                "It contains a company logo",
                "It is addressed to a shared mailbox",
            ],
            1,
            "Look-alike domains (typosquatting) are a classic phishing trick. Logos and timing are easy to fake or mean nothing.",
        ),
        true_false(
            "tf-mfa",
            "Multi-factor authentication makes an account immune to phishing.",
            false,
            "MFA raises the bar, but push fatigue, real-time proxy kits and session token theft still work.",
        ),
        choice(
            "mc-first-step",
            "Ransomware is encrypting files on a laptop. What comes first?",
            &[
                "Pay the ransom to stop the damage",
                "Reboot the laptop",
                "Isolate the laptop from the network",
                "Delete the ransom note",
            ],
            2,
            "Containment first: isolating the host stops the spread to shares and other machines while evidence is preserved.",
        ),
        free_text(
            "ft-tailgating",
            "What is it called when someone follows an employee through a secured door without badging in?",
            &["tailgating", "piggybacking"],
            "Tailgating (also called piggybacking) bypasses physical access control by exploiting politeness.",
        ),
        true_false(
            "tf-report",
            "You should report a suspicious email even if you already deleted it.",
            true,
            "Other people may have received the same message. Your report lets the SOC purge it for everyone.",
        ),
        choice(
            "mc-password",
            "Which password policy gives the best protection?",
            &[
                "Eight characters changed every month",
                "A long unique passphrase per service kept in a password manager",
                "The same strong password everywhere",
                "Your birthday with a symbol appended",
            ],
            1,
            "Length and uniqueness beat complexity rules. Reuse lets one breach unlock every account.",
        ),
        free_text(
            "ft-ioc",
            "What does the abbreviation IOC stand for?",
            &["indicator of compromise", "indicators of compromise"],
            "An Indicator of Compromise is an artifact such as a hash, IP address or domain that points to malicious activity.",
        ),
        Question {
            id: "dm-tools".to_string(),
            prompt: "Match each security tool to what it does.".to_string(),
            explanation: "SIEM correlates logs, EDR watches endpoints, TIP holds threat intelligence and SOAR automates the response.".to_string(),
            kind: QuestionKind::DragMatch {
                items: vec![
                    DragItem { id: "siem".to_string(), label: "SIEM".to_string() },
                    DragItem { id: "edr".to_string(), label: "EDR".to_string() },
                    DragItem { id: "tip".to_string(), label: "TIP".to_string() },
                    DragItem { id: "soar".to_string(), label: "SOAR".to_string() },
                ],
                zones: vec![
                    DropZone {
                        id: "logs".to_string(),
                        label: "Collects and correlates logs from across the network".to_string(),
                        correct_item: "siem".to_string(),
                    },
                    DropZone {
                        id: "endpoint".to_string(),
                        label: "Monitors processes on laptops and can isolate them".to_string(),
                        correct_item: "edr".to_string(),
                    },
                    DropZone {
                        id: "intel".to_string(),
                        label: "Tells you whether an IP or hash is known to be malicious".to_string(),
                        correct_item: "tip".to_string(),
                    },
                    DropZone {
                        id: "automation".to_string(),
                        label: "Runs response playbooks automatically".to_string(),
                        correct_item: "soar".to_string(),
                    },
                ],
            },
        },
    ]
}

pub fn courses() -> Vec<Course> {
    vec![
        Course {
            id: "soc-fundamentals".to_string(),
            title: "SOC Fundamentals".to_string(),
            summary: "Everyday alerts: phishing reports and account attacks.".to_string(),
            scenarios: vec!["phishing-triage".to_string(), "vpn-bruteforce".to_string()],
        },
        Course {
            id: "incident-handling".to_string(),
            title: "Major Incident Handling".to_string(),
            summary: "High-pressure incidents that need containment across teams.".to_string(),
            scenarios: vec!["ransomware-outbreak".to_string(), "usb-leak".to_string()],
        },
    ]
}

pub fn scenarios() -> Vec<ScenarioDefinition> {
    vec![
        ScenarioDefinition {
            id: "phishing-triage".to_string(),
            title: "The Invoice That Wasn't".to_string(),
            priority: Priority::P3,
            role: "Tier 1 SOC analyst".to_string(),
            situation: "Three finance employees reported an email titled \"Overdue invoice #4471\" from a supplier they do not recognise.".to_string(),
            flow: "Find every copy of the email, check the link, purge the message and warn the people who received it.".to_string(),
            result: "The campaign is contained before anyone enters credentials.".to_string(),
            attribution: None,
            time_limit_minutes: Some(10),
            hints: vec![
                "Start with the mail gateway logs in the SIEM.".to_string(),
                "Reputation checks belong in the threat intelligence platform.".to_string(),
            ],
        },
        ScenarioDefinition {
            id: "vpn-bruteforce".to_string(),
            title: "Knocking on the VPN".to_string(),
            priority: Priority::P2,
            role: "Tier 2 SOC analyst".to_string(),
            situation: "The SIEM raised an alert for hundreds of failed VPN logins against a single account in ten minutes.".to_string(),
            flow: "Confirm the attack, profile the source, block it and secure the targeted account.".to_string(),
            result: "The source is blocked and the account owner resets their password.".to_string(),
            attribution: None,
            time_limit_minutes: None,
            hints: vec!["Failed logins are authentication events. Query them first.".to_string()],
        },
        ScenarioDefinition {
            id: "ransomware-outbreak".to_string(),
            title: "Friday Night Encryption".to_string(),
            priority: Priority::P1,
            role: "Incident commander".to_string(),
            situation: "At 23:40 the EDR flags mass file renames on FIN-WS-017. The shared finance drive is starting to fill with .lck files.".to_string(),
            flow: "Understand the alert, cut the host off, protect the backups, identify the strain, block it everywhere and escalate.".to_string(),
            result: "Encryption stops at one workstation and the backups stay clean.".to_string(),
            attribution: Some(AttackAttribution {
                who: "Financially motivated ransomware affiliate".to_string(),
                what: "LockBit-style encryptor delivered through a malicious macro".to_string(),
                when: "Friday 23:12, after the macro document was opened".to_string(),
                where_: "FIN-WS-017 and the finance file share".to_string(),
                how: "Macro spawned PowerShell, downloaded the payload and encrypted mapped drives".to_string(),
                how_much: "Ransom note demands 40 BTC".to_string(),
            }),
            time_limit_minutes: Some(12),
            hints: vec![
                "Contain before you investigate deeply.".to_string(),
                "Some actions happen away from the keyboard.".to_string(),
            ],
        },
        ScenarioDefinition {
            id: "usb-leak".to_string(),
            title: "The Lost Thumb Drive".to_string(),
            priority: Priority::P4,
            role: "Security awareness officer".to_string(),
            situation: "An unlabeled USB stick with customer spreadsheets was found in the car park.".to_string(),
            flow: "Never plug in unknown media. Hand it to the security team, find the owner through the asset register, and notify the data protection officer.".to_string(),
            result: "The data is recovered and encrypted USB sticks become mandatory.".to_string(),
            attribution: None,
            time_limit_minutes: None,
            hints: Vec::new(),
        },
    ]
}

fn phishing_steps() -> Vec<ScenarioStep> {
    vec![
        step(
            1,
            "Find every copy of the email",
            "Search the mail gateway logs for the reported subject line.",
            Tool::Siem,
            ActionKind::Query,
            "All recipients of the message are listed.",
            "Found it: 27 mailboxes received the invoice email from billing@supp1ier-portal.com.",
            "That result does not list the recipients. Run a query against the mail gateway logs.",
            payload(vec![
                ("query", text("index=mail subject=\"Overdue invoice #4471\"")),
                ("hits", PayloadValue::Number(27.0)),
            ]),
        ),
        step(
            2,
            "Check the link",
            "Look up the URL from the email body in threat intelligence.",
            Tool::Tip,
            ActionKind::Analyze,
            "The URL is classified as a credential phishing page.",
            "Confirmed: the domain was registered two days ago and hosts a fake Microsoft 365 login.",
            "You need to analyse the indicator, not just open it.",
            payload(vec![
                ("url", text("hxxps://supp1ier-portal[.]com/invoice/4471")),
                ("first_seen", text("2 days ago")),
            ]),
        ),
        step(
            3,
            "Purge the message",
            "Run the email purge playbook for all 27 mailboxes.",
            Tool::Soar,
            ActionKind::Confirm,
            "The message is removed from every mailbox.",
            "Playbook finished: 27 of 27 messages purged and the sender domain blocked.",
            "The playbook is waiting for your confirmation before it runs.",
            payload(vec![("playbook", text("PB-017 Email purge and block sender"))]),
        ),
        step(
            4,
            "Warn the recipients",
            "Write a short notice to the affected users.",
            Tool::Communication,
            ActionKind::Input,
            "Recipients are told not to open the email and to report any clicks.",
            "Notice sent. Two users reply that they clicked but did not enter credentials.",
            "The notice needs to be written before it can be sent.",
            payload(vec![("recipients", PayloadValue::Number(27.0))]),
        ),
    ]
}

fn vpn_steps() -> Vec<ScenarioStep> {
    vec![
        step(
            1,
            "Confirm the brute force",
            "Query failed VPN authentications for the targeted account.",
            Tool::Siem,
            ActionKind::Query,
            "The failure count and source address are visible.",
            "412 failures in 10 minutes, all from 185.220.101.47.",
            "You need a query over the VPN authentication logs.",
            payload(vec![
                ("query", text("index=vpn action=failure user=m.lopez | stats count by src_ip")),
                ("account", text("m.lopez")),
            ]),
        ),
        step(
            2,
            "Profile the source",
            "Check the source address reputation.",
            Tool::Tip,
            ActionKind::Analyze,
            "The address is identified as a known Tor exit node.",
            "185.220.101.47 is a Tor exit node with a long history of credential stuffing.",
            "Analyse the IP in threat intelligence to learn who is behind it.",
            payload(vec![
                ("ip", text("185.220.101.47")),
                ("tags", list(&["tor-exit", "bruteforce"])),
            ]),
        ),
        step(
            3,
            "Block the source",
            "Select the perimeter block playbook for the address.",
            Tool::Soar,
            ActionKind::Select,
            "The firewall drops traffic from the source.",
            "Block rule pushed to both VPN concentrators.",
            "Pick the block playbook from the list first.",
            payload(vec![("playbooks", list(&["PB-003 Block IP", "PB-009 Disable account"]))]),
        ),
        step(
            4,
            "Secure the account",
            "Confirm with the account owner and trigger a password reset.",
            Tool::Communication,
            ActionKind::Confirm,
            "The owner confirms and resets their password.",
            "Maria confirms she was asleep. Password reset and MFA re-enrolment completed.",
            "Confirm the reset with the owner before closing the ticket.",
            Payload::new(),
        ),
    ]
}

fn ransomware_steps() -> Vec<ScenarioStep> {
    vec![
        step(
            1,
            "Read the alert",
            "Analyse the process tree on FIN-WS-017.",
            Tool::Edr,
            ActionKind::Analyze,
            "WINWORD.EXE spawned PowerShell, which launched the encryptor.",
            "Process tree shows WINWORD.EXE → powershell.exe -enc … → svch0st.exe renaming files.",
            "Clicking around will not explain the alert. Analyse the process tree.",
            payload(vec![
                ("host", text("FIN-WS-017")),
                ("processes", list(&["WINWORD.EXE", "powershell.exe", "svch0st.exe"])),
            ]),
        ),
        step(
            2,
            "Isolate the host",
            "Cut FIN-WS-017 off the network from the EDR console.",
            Tool::Edr,
            ActionKind::Click,
            "The host can only talk to the EDR server.",
            "FIN-WS-017 is isolated. File renames on the share have stopped.",
            "Isolation is a single click on the host page. Do it now.",
            payload(vec![("host", text("FIN-WS-017"))]),
        ),
        step(
            3,
            "Protect the backups",
            "Physically disconnect the backup NAS in the server room.",
            Tool::Physical,
            ActionKind::Confirm,
            "The backup appliance is offline and untouched.",
            "Backup NAS unplugged. Last night's snapshot is intact.",
            "Confirm at the rack that the NAS cable is pulled.",
            payload(vec![("location", text("Server room B, rack 4"))]),
        ),
        step(
            4,
            "Identify the strain",
            "Query threat intelligence with the encryptor hash.",
            Tool::Tip,
            ActionKind::Query,
            "The hash matches a known ransomware family.",
            "Hash matches a LockBit 3.0 build seen in the wild since last month.",
            "Run the hash as a query in threat intelligence.",
            payload(vec![(
                "sha256",
                text("9f2a6c1e0b7d4e38a1c55f0d2b8e6a7c3d9e0f1a2b3c4d5e6f708192a3b4c5d6"),
            )]),
        ),
        step(
            5,
            "Block it everywhere",
            "Confirm the IOC block playbook for all endpoints.",
            Tool::Soar,
            ActionKind::Confirm,
            "The hash and C2 domains are blocked fleet-wide.",
            "IOC block deployed to 1,240 endpoints.",
            "The playbook needs your confirmation to run.",
            payload(vec![("iocs", list(&["sha256:9f2a6c1e…", "c2.lck-support[.]net"]))]),
        ),
        step(
            6,
            "Escalate",
            "Brief the CISO on what happened and what you did.",
            Tool::Communication,
            ActionKind::Input,
            "Leadership is informed and the incident bridge is opened.",
            "CISO briefed. Legal and communications are joining the bridge.",
            "Write the briefing before you send it.",
            Payload::new(),
        ),
    ]
}

pub fn catalog() -> Catalog {
    let mut steps = BTreeMap::new();
    steps.insert("phishing-triage".to_string(), phishing_steps());
    steps.insert("vpn-bruteforce".to_string(), vpn_steps());
    steps.insert("ransomware-outbreak".to_string(), ransomware_steps());

    Catalog {
        briefing: briefing(),
        quiz: quiz(),
        courses: courses(),
        scenarios: scenarios(),
        steps,
    }
}
