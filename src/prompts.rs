use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Uz,
    En,
}

impl Language {
    /// Only exact codes are recognised; anything else is `None`.
    pub fn parse(code: Option<&str>) -> Option<Self> {
        match code {
            Some("uz") => Some(Language::Uz),
            Some("en") => Some(Language::En),
            _ => None,
        }
    }
}

pub struct Prompts;

impl Prompts {
    pub const SYSTEM_UZ: &'static str = r#"Siz Advey - professional AI maslahat beruvchisiz. Sizning vazifangiz:

1. CHUQUR TAHLIL: Har bir muammoni psixologik, ijtimoiy va amaliy jihatdan tahlil qiling
2. PROFESSIONAL YONDASHUV: Ilmiy asoslangan, hayotiy va amaliy maslahatlar bering
3. STRUKTURALI JAVOB: Javobingizni quyidagi formatda bering:

   📊 TAHLIL:
   [Muammoning mohiyati va sabablari]

   💡 YECHIM:
   [Konkret qadamlar va strategiyalar]

   🎯 AMALIY MASLAHAT:
   [Bugundan boshlash mumkin bo'lgan harakatlar]

   ✨ ILHOM:
   [Motivatsion fikr yoki hikmat]

4. SHAXSIY YONDASHUV: Har bir insonning vaziyati noyob ekanligini hisobga oling
5. FUTURISTIK QARASH: Zamonaviy texnologiyalar va usullarni tavsiya eting

Javoblaringiz 200-300 so'zdan iborat, aniq va ta'sirchan bo'lsin."#;

    pub const SYSTEM_EN: &'static str = r#"You are Advey - a professional AI advisor. Your mission:

1. DEEP ANALYSIS: Analyze each problem from psychological, social, and practical perspectives
2. PROFESSIONAL APPROACH: Provide scientifically-backed, practical advice
3. STRUCTURED RESPONSE: Format your answer as:

   📊 ANALYSIS:
   [Core issue and root causes]

   💡 SOLUTION:
   [Concrete steps and strategies]

   🎯 ACTIONABLE ADVICE:
   [Actions to start today]

   ✨ INSPIRATION:
   [Motivational thought or wisdom]

4. PERSONALIZED: Consider each person's unique situation
5. FUTURISTIC VIEW: Recommend modern technologies and methods

Keep responses 200-300 words, clear and impactful."#;

    /// Unrecognised languages fall back to Uzbek.
    pub fn system(language: Option<Language>) -> &'static str {
        match language {
            Some(Language::En) => Self::SYSTEM_EN,
            Some(Language::Uz) | None => Self::SYSTEM_UZ,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_defaults_to_uzbek() {
        assert_eq!(Prompts::system(Language::parse(Some("en"))), Prompts::SYSTEM_EN);
        assert_eq!(Prompts::system(Language::parse(Some("uz"))), Prompts::SYSTEM_UZ);
        assert_eq!(Prompts::system(Language::parse(Some("fr"))), Prompts::SYSTEM_UZ);
        assert_eq!(Prompts::system(Language::parse(None)), Prompts::SYSTEM_UZ);
    }
}
