// Copyright (c) 2024 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use std::fmt;
use std::str::FromStr;

use canonical_error::{invalid_argument_error, CanonicalError};

macro_rules! constellations {
    ($($variant:ident => ($abbrev:literal, $name:literal),)*) => {
        /// The 88 IAU constellations.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Constellation {
            $($variant,)*
        }

        impl Constellation {
            pub const ALL: &'static [Constellation] =
                &[$(Constellation::$variant,)*];

            /// IAU three letter abbreviation, e.g. "UMa".
            pub fn abbreviation(&self) -> &'static str {
                match self {
                    $(Constellation::$variant => $abbrev,)*
                }
            }

            pub fn name(&self) -> &'static str {
                match self {
                    $(Constellation::$variant => $name,)*
                }
            }
        }
    };
}

constellations! {
    Andromeda => ("And", "Andromeda"),
    Antlia => ("Ant", "Antlia"),
    Apus => ("Aps", "Apus"),
    Aquarius => ("Aqr", "Aquarius"),
    Aquila => ("Aql", "Aquila"),
    Ara => ("Ara", "Ara"),
    Aries => ("Ari", "Aries"),
    Auriga => ("Aur", "Auriga"),
    Bootes => ("Boo", "Bootes"),
    Caelum => ("Cae", "Caelum"),
    Camelopardalis => ("Cam", "Camelopardalis"),
    Cancer => ("Cnc", "Cancer"),
    CanesVenatici => ("CVn", "Canes Venatici"),
    CanisMajor => ("CMa", "Canis Major"),
    CanisMinor => ("CMi", "Canis Minor"),
    Capricornus => ("Cap", "Capricornus"),
    Carina => ("Car", "Carina"),
    Cassiopeia => ("Cas", "Cassiopeia"),
    Centaurus => ("Cen", "Centaurus"),
    Cepheus => ("Cep", "Cepheus"),
    Cetus => ("Cet", "Cetus"),
    Chamaeleon => ("Cha", "Chamaeleon"),
    Circinus => ("Cir", "Circinus"),
    Columba => ("Col", "Columba"),
    ComaBerenices => ("Com", "Coma Berenices"),
    CoronaAustralis => ("CrA", "Corona Australis"),
    CoronaBorealis => ("CrB", "Corona Borealis"),
    Corvus => ("Crv", "Corvus"),
    Crater => ("Crt", "Crater"),
    Crux => ("Cru", "Crux"),
    Cygnus => ("Cyg", "Cygnus"),
    Delphinus => ("Del", "Delphinus"),
    Dorado => ("Dor", "Dorado"),
    Draco => ("Dra", "Draco"),
    Equuleus => ("Equ", "Equuleus"),
    Eridanus => ("Eri", "Eridanus"),
    Fornax => ("For", "Fornax"),
    Gemini => ("Gem", "Gemini"),
    Grus => ("Gru", "Grus"),
    Hercules => ("Her", "Hercules"),
    Horologium => ("Hor", "Horologium"),
    Hydra => ("Hya", "Hydra"),
    Hydrus => ("Hyi", "Hydrus"),
    Indus => ("Ind", "Indus"),
    Lacerta => ("Lac", "Lacerta"),
    Leo => ("Leo", "Leo"),
    LeoMinor => ("LMi", "Leo Minor"),
    Lepus => ("Lep", "Lepus"),
    Libra => ("Lib", "Libra"),
    Lupus => ("Lup", "Lupus"),
    Lynx => ("Lyn", "Lynx"),
    Lyra => ("Lyr", "Lyra"),
    Mensa => ("Men", "Mensa"),
    Microscopium => ("Mic", "Microscopium"),
    Monoceros => ("Mon", "Monoceros"),
    Musca => ("Mus", "Musca"),
    Norma => ("Nor", "Norma"),
    Octans => ("Oct", "Octans"),
    Ophiuchus => ("Oph", "Ophiuchus"),
    Orion => ("Ori", "Orion"),
    Pavo => ("Pav", "Pavo"),
    Pegasus => ("Peg", "Pegasus"),
    Perseus => ("Per", "Perseus"),
    Phoenix => ("Phe", "Phoenix"),
    Pictor => ("Pic", "Pictor"),
    Pisces => ("Psc", "Pisces"),
    PiscisAustrinus => ("PsA", "Piscis Austrinus"),
    Puppis => ("Pup", "Puppis"),
    Pyxis => ("Pyx", "Pyxis"),
    Reticulum => ("Ret", "Reticulum"),
    Sagitta => ("Sge", "Sagitta"),
    Sagittarius => ("Sgr", "Sagittarius"),
    Scorpius => ("Sco", "Scorpius"),
    Sculptor => ("Scl", "Sculptor"),
    Scutum => ("Sct", "Scutum"),
    Serpens => ("Ser", "Serpens"),
    Sextans => ("Sex", "Sextans"),
    Taurus => ("Tau", "Taurus"),
    Telescopium => ("Tel", "Telescopium"),
    Triangulum => ("Tri", "Triangulum"),
    TriangulumAustrale => ("TrA", "Triangulum Australe"),
    Tucana => ("Tuc", "Tucana"),
    UrsaMajor => ("UMa", "Ursa Major"),
    UrsaMinor => ("UMi", "Ursa Minor"),
    Vela => ("Vel", "Vela"),
    Virgo => ("Vir", "Virgo"),
    Volans => ("Vol", "Volans"),
    Vulpecula => ("Vul", "Vulpecula"),
}

impl fmt::Display for Constellation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// Accepts the abbreviation or the full name, ignoring case and spaces.
// OpenNGC splits Serpens into Se1 (Caput) and Se2 (Cauda).
impl FromStr for Constellation {
    type Err = CanonicalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        if wanted == "se1" || wanted == "se2" {
            return Ok(Constellation::Serpens);
        }
        Constellation::ALL
            .iter()
            .find(|c| {
                c.abbreviation().to_ascii_lowercase() == wanted
                    || c.name().replace(' ', "").to_ascii_lowercase() == wanted
            })
            .copied()
            .ok_or_else(|| {
                invalid_argument_error(
                    format!("Unknown constellation {:?}", s).as_str(),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_constellations() {
        assert_eq!(Constellation::ALL.len(), 88);
        for c in Constellation::ALL {
            assert_eq!(c.abbreviation().len(), 3);
            assert_eq!(c.abbreviation().parse::<Constellation>().unwrap(), *c);
            assert_eq!(c.name().parse::<Constellation>().unwrap(), *c);
        }
    }

    #[test]
    fn test_parse_variants() {
        assert_eq!("uma".parse::<Constellation>().unwrap(),
                   Constellation::UrsaMajor);
        assert_eq!("ursa major".parse::<Constellation>().unwrap(),
                   Constellation::UrsaMajor);
        assert_eq!("Se2".parse::<Constellation>().unwrap(),
                   Constellation::Serpens);
        assert!("Xyz".parse::<Constellation>().is_err());
    }

} // mod tests.
