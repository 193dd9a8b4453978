use crate::application::dispatcher::{Holding, Report};
use crate::domain::event::{BallotEvent, Event, EventRecord, LedgerEvent, RegistryEvent};
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize, PartialEq)]
struct EventRow {
    call: u64,
    seq: u32,
    engine: &'static str,
    event: &'static str,
    from: String,
    to: String,
    value: String,
}

impl From<&EventRecord> for EventRow {
    fn from(record: &EventRecord) -> Self {
        let (engine, event, from, to, value) = match &record.event {
            Event::Ledger(LedgerEvent::Transfer { from, to, amount }) => (
                "ledger",
                "Transfer",
                from.to_string(),
                to.to_string(),
                amount.to_string(),
            ),
            Event::Ledger(LedgerEvent::Approval {
                owner,
                spender,
                amount,
            }) => (
                "ledger",
                "Approval",
                owner.to_string(),
                spender.to_string(),
                amount.to_string(),
            ),
            Event::Registry(RegistryEvent::Transfer { from, to, item_id }) => (
                "registry",
                "Transfer",
                from.to_string(),
                to.to_string(),
                item_id.to_string(),
            ),
            Event::Registry(RegistryEvent::Approval {
                owner,
                approved,
                item_id,
            }) => (
                "registry",
                "Approval",
                owner.to_string(),
                approved.to_string(),
                item_id.to_string(),
            ),
            Event::Registry(RegistryEvent::ApprovalForAll {
                owner,
                operator,
                approved,
            }) => (
                "registry",
                "ApprovalForAll",
                owner.to_string(),
                operator.to_string(),
                approved.to_string(),
            ),
            Event::Ballot(BallotEvent::VoteCast { voter, option }) => (
                "ballot",
                "VoteCast",
                voter.to_string(),
                String::new(),
                option.clone(),
            ),
        };
        Self {
            call: record.call,
            seq: record.seq,
            engine,
            event,
            from,
            to,
            value,
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
struct ReportRow {
    section: &'static str,
    key: String,
    value: String,
    /// Whole-token rendering of `value`, for amounts only.
    units: String,
}

impl ReportRow {
    fn new(section: &'static str, key: impl ToString, value: impl ToString) -> Self {
        Self {
            section,
            key: key.to_string(),
            value: value.to_string(),
            units: String::new(),
        }
    }

    fn amount(section: &'static str, key: impl ToString, holding: &Holding) -> Self {
        Self {
            units: holding.units.map(|units| units.to_string()).unwrap_or_default(),
            ..Self::new(section, key, holding.raw)
        }
    }
}

fn report_rows(report: &Report) -> Vec<ReportRow> {
    let mut rows = vec![
        ReportRow::new("token", "name", &report.token_name),
        ReportRow::new("token", "symbol", &report.token_symbol),
        ReportRow::new("token", "decimals", report.decimals),
        ReportRow::amount("token", "total_supply", &report.total_supply),
    ];
    rows.extend(
        report
            .balances
            .iter()
            .map(|(account, holding)| ReportRow::amount("balance", account, holding)),
    );
    rows.extend(
        report
            .items
            .iter()
            .map(|(item_id, owner)| ReportRow::new("owner", item_id, owner)),
    );
    rows.extend(
        report
            .options
            .iter()
            .map(|option| ReportRow::new("option", &option.label, option.vote_count)),
    );
    for (key, outcome) in [("leader", &report.leader), ("winner", &report.winner)] {
        let value = match outcome {
            Ok(label) => label.clone(),
            Err(reason) => format!("none ({reason})"),
        };
        rows.push(ReportRow::new("ballot", key, value));
    }
    rows
}

/// Writes committed events and the final report as CSV.
pub struct OutputWriter<W: Write> {
    writer: W,
}

impl<W: Write> OutputWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes one row per event, header `call,seq,engine,event,from,to,value`.
    pub fn write_events(&mut self, records: &[EventRecord]) -> Result<()> {
        let mut csv = csv::Writer::from_writer(&mut self.writer);
        if records.is_empty() {
            csv.write_record(["call", "seq", "engine", "event", "from", "to", "value"])?;
        }
        for record in records {
            csv.serialize(EventRow::from(record))?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Writes the report, header `section,key,value,units`.
    pub fn write_report(&mut self, report: &Report) -> Result<()> {
        let mut csv = csv::Writer::from_writer(&mut self.writer);
        for row in report_rows(report) {
            csv.serialize(row)?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Writes the events, a blank separator line, then the report.
    pub fn write_all(&mut self, records: &[EventRecord], report: &Report) -> Result<()> {
        self.write_events(records)?;
        writeln!(self.writer)?;
        self.write_report(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ballot::BallotOption;
    use crate::domain::identity::Identity;
    use rust_decimal_macros::dec;

    fn report() -> Report {
        Report {
            token_name: "Token".to_string(),
            token_symbol: "TKN".to_string(),
            decimals: 2,
            total_supply: Holding {
                raw: 100,
                units: Some(dec!(1)),
            },
            balances: vec![
                (
                    Identity(1),
                    Holding {
                        raw: 60,
                        units: Some(dec!(0.6)),
                    },
                ),
                (
                    Identity(2),
                    Holding {
                        raw: 40,
                        units: None,
                    },
                ),
            ],
            items: vec![(7, Identity(2))],
            options: vec![BallotOption {
                label: "Yes".to_string(),
                vote_count: 0,
            }],
            leader: Err("no votes have been cast yet".to_string()),
            winner: Err("no votes have been cast yet".to_string()),
        }
    }

    #[test]
    fn test_write_all() {
        let records = vec![EventRecord {
            call: 0,
            seq: 0,
            event: Event::Ledger(LedgerEvent::Transfer {
                from: Identity(1),
                to: Identity(2),
                amount: 40,
            }),
        }];

        let mut buffer = Vec::new();
        OutputWriter::new(&mut buffer)
            .write_all(&records, &report())
            .unwrap();
        let output = String::from_utf8(buffer).unwrap();

        assert!(output.starts_with(
            "call,seq,engine,event,from,to,value\n0,0,ledger,Transfer,1,2,40\n\n"
        ));
        assert!(output.contains("section,key,value,units\n"));
        assert!(output.contains("token,decimals,2,\n"));
        assert!(output.contains("token,total_supply,100,1\n"));
        assert!(output.contains("balance,1,60,0.6\n"));
        assert!(output.contains("balance,2,40,\n"));
        assert!(output.contains("owner,7,2,\n"));
        assert!(output.contains("option,Yes,0,\n"));
        assert!(output.contains("ballot,leader,none (no votes have been cast yet),\n"));
    }

    #[test]
    fn test_write_events_empty_keeps_header() {
        let mut buffer = Vec::new();
        OutputWriter::new(&mut buffer).write_events(&[]).unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "call,seq,engine,event,from,to,value\n"
        );
    }
}
