//! Per-nation crew name lists

use crate::core::dice::Dice;
use crate::core::types::Nation;

fn first_names(nation: Nation) -> &'static [&'static str] {
    match nation {
        Nation::Germany => &[
            "Hans", "Karl", "Otto", "Walter", "Fritz", "Ernst", "Heinrich", "Paul", "Kurt",
            "Wilhelm", "Erich", "Gerhard",
        ],
        Nation::Poland => &[
            "Jan", "Stanislaw", "Józef", "Tadeusz", "Kazimierz", "Wladyslaw", "Zbigniew",
            "Henryk", "Marian", "Edward",
        ],
        Nation::SovietUnion => &[
            "Ivan", "Nikolai", "Sergei", "Pyotr", "Mikhail", "Alexei", "Dmitri", "Vasily",
            "Grigori", "Yuri",
        ],
        Nation::France => &[
            "Jean", "Pierre", "Louis", "Henri", "Marcel", "André", "René", "Georges", "Paul",
            "Jacques",
        ],
    }
}

fn surnames(nation: Nation) -> &'static [&'static str] {
    match nation {
        Nation::Germany => &[
            "Müller", "Schmidt", "Schneider", "Fischer", "Weber", "Meyer", "Wagner", "Becker",
            "Hoffmann", "Schulz", "Koch", "Richter",
        ],
        Nation::Poland => &[
            "Nowak", "Kowalski", "Wisniewski", "Wójcik", "Kowalczyk", "Kaminski", "Lewandowski",
            "Zielinski", "Szymanski", "Wozniak",
        ],
        Nation::SovietUnion => &[
            "Ivanov", "Smirnov", "Kuznetsov", "Popov", "Vasiliev", "Petrov", "Sokolov",
            "Mikhailov", "Fedorov", "Morozov",
        ],
        Nation::France => &[
            "Martin", "Bernard", "Dubois", "Thomas", "Robert", "Richard", "Petit", "Durand",
            "Leroy", "Moreau",
        ],
    }
}

/// Random full name for a crewman of `nation`
pub fn random_name(nation: Nation, dice: &mut dyn Dice) -> String {
    let first = first_names(nation);
    let last = surnames(nation);
    format!("{} {}", first[dice.index(first.len())], last[dice.index(last.len())])
}
