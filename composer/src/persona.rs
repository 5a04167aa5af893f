use chrono::Weekday;
use rand::seq::SliceRandom;
use rand::Rng;

/// Named style applied to every AI request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    pub name: String,
    pub tone: String,
    pub instructions: String,
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            name: "Бот".to_string(),
            tone: "ироничная, дружелюбная".to_string(),
            instructions: "Ты участник группового чата друзей. Отвечай коротко и по делу, \
                           с иронией, и будь полезным помощником."
                .to_string(),
        }
    }
}

/// What caused the reply; selects the canned-phrase pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    /// Mention of the bot or reply to one of its messages.
    Mention,
    /// Configured trigger phrase (lowercased).
    Phrase(String),
    /// Morning greeting.
    Greeting,
}

/// Canned phrases: `rare` is picked with a fixed probability, otherwise `common`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhrasePool {
    pub common: Vec<String>,
    pub rare: Vec<String>,
}

impl PhrasePool {
    pub fn new(common: Vec<String>, rare: Vec<String>) -> Self {
        Self { common, rare }
    }

    pub fn is_empty(&self) -> bool {
        self.common.is_empty() && self.rare.is_empty()
    }

    /// Picks a phrase; `None` only when both lists are empty.
    pub fn pick<R: Rng>(&self, rng: &mut R, rare_probability: f64) -> Option<&str> {
        let p = rare_probability.clamp(0.0, 1.0);
        let use_rare = !self.rare.is_empty() && (self.common.is_empty() || rng.gen_bool(p));
        let list = if use_rare { &self.rare } else { &self.common };
        list.choose(rng).map(String::as_str)
    }
}

pub const DEFAULT_GREETING: &str =
    "❤️ Желаю всем хорошего и продуктивного дня! Пусть всё задуманное получится!";

fn day_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "понедельник",
        Weekday::Tue => "вторник",
        Weekday::Wed => "среда",
        Weekday::Thu => "четверг",
        Weekday::Fri => "пятница",
        Weekday::Sat => "суббота",
        Weekday::Sun => "воскресенье",
    }
}

/// Request for the morning wish; weekends and Friday get their own wording.
pub fn greeting_prompt(weekday: Weekday) -> String {
    let day = day_name(weekday);
    let wish = match weekday {
        Weekday::Sat | Weekday::Sun => {
            "пожелание хороших выходных для утреннего приветствия в групповом чате друзей. \
             Пожелание должно быть позитивным, с юмором, и учитывать, что сегодня выходной."
        }
        Weekday::Fri => {
            "пожелание отличной пятницы и предстоящих выходных для утреннего приветствия \
             в групповом чате друзей. Пожелание должно быть позитивным, с юмором."
        }
        _ => {
            "пожелание продуктивного дня для утреннего приветствия в групповом чате друзей. \
             Пожелание должно быть позитивным, с юмором, и учитывать день недели."
        }
    };
    format!(
        "Сегодня {}. Сгенерируй уникальное и креативное {} Длина 2-3 предложения. \
         Добавь эмодзи. Не используй обращения.",
        day, wish
    )
}
