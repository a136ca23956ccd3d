//! Built-in development catalog used to seed the model at startup.

use crate::models::Game;

pub fn sample_games() -> Vec<Game> {
    vec![
        Game::new(101)
            .with_name("Pandemic")
            .with_categories(&["Strategy", "Cooperative", "Medical"])
            .with_mechanics(&["Hand Management", "Action Points", "Trading"])
            .with_players(2, 4)
            .with_playtime(45)
            .with_complexity(2.4)
            .with_year(2008)
            .with_rating(4.2),
        Game::new(102)
            .with_name("Catan")
            .with_categories(&["Strategy", "Negotiation", "Economic"])
            .with_mechanics(&["Trading", "Dice Rolling", "Network Building"])
            .with_players(3, 4)
            .with_playtime(90)
            .with_complexity(2.3)
            .with_year(1995)
            .with_rating(4.0),
        Game::new(103)
            .with_name("Ticket to Ride")
            .with_categories(&["Family", "Strategy", "Trains"])
            .with_mechanics(&["Set Collection", "Route Building", "Hand Management"])
            .with_players(2, 5)
            .with_playtime(60)
            .with_complexity(1.9)
            .with_year(2004)
            .with_rating(4.1),
        Game::new(104)
            .with_name("7 Wonders")
            .with_categories(&["Strategy", "Card Game", "Civilization"])
            .with_mechanics(&["Card Drafting", "Set Collection", "Variable Player Powers"])
            .with_players(2, 7)
            .with_playtime(30)
            .with_complexity(2.3)
            .with_year(2010)
            .with_rating(4.3),
        Game::new(105)
            .with_name("Azul")
            .with_categories(&["Abstract", "Puzzle", "Family"])
            .with_mechanics(&["Pattern Building", "Set Collection", "Tile Placement"])
            .with_players(2, 4)
            .with_playtime(30)
            .with_complexity(1.8)
            .with_year(2017)
            .with_rating(4.3),
        Game::new(106)
            .with_name("Wingspan")
            .with_categories(&["Strategy", "Animals", "Card Game"])
            .with_mechanics(&["Hand Management", "Set Collection", "Engine Building"])
            .with_players(1, 5)
            .with_playtime(70)
            .with_complexity(2.4)
            .with_year(2019)
            .with_rating(4.4),
        Game::new(107)
            .with_name("Splendor")
            .with_categories(&["Strategy", "Economic", "Renaissance"])
            .with_mechanics(&["Set Collection", "Engine Building", "Card Development"])
            .with_players(2, 4)
            .with_playtime(30)
            .with_complexity(1.8)
            .with_year(2014)
            .with_rating(4.0),
        Game::new(108)
            .with_name("Dominion")
            .with_categories(&["Strategy", "Card Game", "Medieval"])
            .with_mechanics(&["Deck Building", "Hand Management", "Card Drafting"])
            .with_players(2, 4)
            .with_playtime(30)
            .with_complexity(2.4)
            .with_year(2008)
            .with_rating(4.1),
        Game::new(109)
            .with_name("Codenames")
            .with_categories(&["Party Game", "Word Game", "Deduction"])
            .with_mechanics(&["Team Play", "Pattern Recognition", "Communication"])
            .with_players(4, 8)
            .with_playtime(15)
            .with_complexity(1.3)
            .with_year(2015)
            .with_rating(4.2),
        Game::new(110)
            .with_name("Terraforming Mars")
            .with_categories(&["Strategy", "Economic", "Science Fiction"])
            .with_mechanics(&["Card Drafting", "Hand Management", "Tile Placement"])
            .with_players(1, 5)
            .with_playtime(120)
            .with_complexity(3.2)
            .with_year(2016)
            .with_rating(4.5),
    ]
}
