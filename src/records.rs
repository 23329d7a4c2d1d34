//! Text layout of the numeric records
//!
//! Every record is read with [str::parse] and written with
//! [ToString::to_string]. Writing uses the fixed column widths and
//! precisions of the reference implementations, so that downstream tools
//! relying on fixed-width parsing keep working.
use std::fmt;
use std::str::FromStr;

use crate::data::{EventInfo, InitInfo, Particle, ProcInfo};
use crate::error::FormatError;
use crate::numbers::{fields, float, int, Exp, Int};

impl FromStr for InitInfo {
    type Err = FormatError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        const RECORD: &str = "init";
        let [beam_a, beam_b, energy_a, energy_b, pdf_group_a, pdf_group_b, pdf_set_a, pdf_set_b, weighting_strategy, num_processes] =
            fields::<10>(RECORD, line)?;
        Ok(InitInfo {
            beam_a: int(RECORD, "beam_a", beam_a)?,
            beam_b: int(RECORD, "beam_b", beam_b)?,
            energy_a: float(RECORD, "energy_a", energy_a)?,
            energy_b: float(RECORD, "energy_b", energy_b)?,
            pdf_group_a: int(RECORD, "pdf_group_a", pdf_group_a)?,
            pdf_group_b: int(RECORD, "pdf_group_b", pdf_group_b)?,
            pdf_set_a: int(RECORD, "pdf_set_a", pdf_set_a)?,
            pdf_set_b: int(RECORD, "pdf_set_b", pdf_set_b)?,
            weighting_strategy: int(RECORD, "weighting_strategy", weighting_strategy)?,
            num_processes: int(RECORD, "num_processes", num_processes)?,
        })
    }
}

impl fmt::Display for InitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            " {} {} {} {} {} {} {} {} {} {}",
            Int::signed(self.beam_a, 6),
            Int::signed(self.beam_b, 6),
            Exp::signed(self.energy_a, 14, 7),
            Exp::signed(self.energy_b, 14, 7),
            Int::signed(self.pdf_group_a, 5),
            Int::signed(self.pdf_group_b, 5),
            Int::signed(self.pdf_set_a, 5),
            Int::signed(self.pdf_set_b, 5),
            Int::signed(self.weighting_strategy, 5),
            Int::signed(self.num_processes, 5),
        )
    }
}

impl FromStr for ProcInfo {
    type Err = FormatError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        const RECORD: &str = "process";
        let [x_section, error, unit_weight, proc_id] = fields::<4>(RECORD, line)?;
        Ok(ProcInfo {
            x_section: float(RECORD, "x_section", x_section)?,
            error: float(RECORD, "error", error)?,
            unit_weight: float(RECORD, "unit_weight", unit_weight)?,
            proc_id: int(RECORD, "proc_id", proc_id)?,
        })
    }
}

impl fmt::Display for ProcInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            Exp::signed(self.x_section, 14, 7),
            Exp::signed(self.error, 14, 7),
            Exp::signed(self.unit_weight, 14, 7),
            Int::signed(self.proc_id, 5),
        )
    }
}

impl FromStr for EventInfo {
    type Err = FormatError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        const RECORD: &str = "event";
        let [nparticles, pid, weight, scale, aqed, aqcd] = fields::<6>(RECORD, line)?;
        Ok(EventInfo {
            nparticles: int(RECORD, "nparticles", nparticles)?,
            pid: int(RECORD, "pid", pid)?,
            weight: float(RECORD, "weight", weight)?,
            scale: float(RECORD, "scale", scale)?,
            aqed: float(RECORD, "aqed", aqed)?,
            aqcd: float(RECORD, "aqcd", aqcd)?,
        })
    }
}

impl fmt::Display for EventInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            Int::new(self.nparticles, 3),
            Int::new(self.pid, 6),
            Exp::signed(self.weight, 15, 10),
            Exp::signed(self.scale, 15, 10),
            Exp::signed(self.aqed, 15, 10),
            Exp::signed(self.aqcd, 15, 10),
        )
    }
}

impl FromStr for Particle {
    type Err = FormatError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        const RECORD: &str = "particle";
        let [id, status, mother1, mother2, color1, color2, px, py, pz, e, m, lifetime, spin] =
            fields::<13>(RECORD, line)?;
        Ok(Particle {
            id: int(RECORD, "id", id)?,
            status: int(RECORD, "status", status)?,
            mother1: int(RECORD, "mother1", mother1)?,
            mother2: int(RECORD, "mother2", mother2)?,
            color1: int(RECORD, "color1", color1)?,
            color2: int(RECORD, "color2", color2)?,
            px: float(RECORD, "px", px)?,
            py: float(RECORD, "py", py)?,
            pz: float(RECORD, "pz", pz)?,
            e: float(RECORD, "e", e)?,
            m: float(RECORD, "m", m)?,
            lifetime: float(RECORD, "lifetime", lifetime)?,
            spin: float(RECORD, "spin", spin)?,
        })
    }
}

impl fmt::Display for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            Int::new(self.id, 5),
            Int::new(self.status, 3),
            Int::new(self.mother1, 3),
            Int::new(self.mother2, 3),
            Int::new(self.color1, 3),
            Int::new(self.color2, 3),
        )?;
        for p in [self.px, self.py, self.pz, self.e, self.m] {
            write!(f, " {}", Exp::signed(p, 15, 8))?;
        }
        write!(
            f,
            " {} {}",
            Exp::signed(self.lifetime, 10, 4),
            Exp::signed(self.spin, 10, 4)
        )
    }
}
