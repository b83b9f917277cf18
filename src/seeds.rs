//! Built-in challenges with known linking players.
//! Guarantee the game is playable even without external config or OpenAI.

use crate::bank::BankEntry;

/// Two or more entries per difficulty tier.
pub fn seed_challenges() -> Vec<BankEntry> {
  vec![
    // Levels 1-2: global giants
    BankEntry::new(1, "Real Madrid", "Manchester United", &[
      "Cristiano Ronaldo", "David Beckham", "Ruud van Nistelrooy", "Ángel Di María",
      "Raphaël Varane", "Casemiro", "Gabriel Heinze",
    ]),
    BankEntry::new(1, "Barcelona", "Bayern Munich", &[
      "Robert Lewandowski", "Thiago Alcântara", "Arturo Vidal", "Philippe Coutinho",
    ]),
    BankEntry::new(2, "Juventus", "Real Madrid", &[
      "Zinedine Zidane", "Cristiano Ronaldo", "Fabio Cannavaro", "Emerson", "Sami Khedira", "Gonzalo Higuaín",
    ]),
    // Levels 3-4: top-tier big-five clubs
    BankEntry::new(3, "Arsenal", "Borussia Dortmund", &[
      "Pierre-Emerick Aubameyang", "Henrikh Mkhitaryan", "Tomáš Rosický", "Sokratis Papastathopoulos",
    ]),
    BankEntry::new(4, "Roma", "Liverpool", &["Mohamed Salah", "Alisson Becker"]),
    // Levels 5-6: major non-big-five or mid-table big-five clubs
    BankEntry::new(5, "Ajax", "Everton", &["Davy Klaassen"]),
    BankEntry::new(6, "Ajax", "Benfica", &["Jan Vertonghen"]),
    // Levels 7-8: lower-table big-five or top smaller-league clubs
    BankEntry::new(7, "Celtic", "Southampton", &["Virgil van Dijk", "Victor Wanyama", "Fraser Forster"]),
    BankEntry::new(8, "Celtic", "Liverpool", &["Kenny Dalglish", "Virgil van Dijk"]),
    // Levels 9-10: lower divisions / obscure clubs
    BankEntry::new(9, "Hull City", "Liverpool", &["Andy Robertson"]),
    BankEntry::new(10, "Luton Town", "Everton", &["Ross Barkley"]),
  ]
}
