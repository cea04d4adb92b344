//! Word lists loaded by [`Vocabulary::seeded`](super::Vocabulary::seeded), in load order.

/// Frequent English words and academic vocabulary.
pub const COMMON_WORDS: &[&str] = &[
    "the", "of", "and", "a", "to", "in", "is", "you", "that", "it", "he", "was", "for", "on",
    "are", "as", "with", "his", "they", "i", "at", "be", "this", "have", "from", "or", "one",
    "had", "by", "word", "but", "not", "what", "all", "were", "we", "when", "your", "can", "said",
    "there", "each", "which", "she", "do", "how", "their", "if", "will", "up", "other", "about",
    "out", "many", "then", "them", "these", "so", "some", "her", "would", "make", "like", "into",
    "him", "has", "two", "more", "very", "after", "words", "first", "been", "who", "its", "now",
    "find", "long", "down", "day", "did", "get", "come", "made", "may", "part", "over", "new",
    "sound", "take", "only", "little", "work", "know", "place", "year", "live", "me", "back",
    "give", "most", "very", "after", "thing", "our", "just", "name", "good", "sentence", "man",
    "think", "say", "great", "where", "help", "through", "much", "before", "line", "right", "too",
    "mean", "old", "any", "same", "tell", "boy", "follow", "came", "want", "show", "also",
    "around", "form", "three", "small", "set", "put", "end", "why", "again", "turn", "here", "off",
    "went", "old", "number", "no", "way", "could", "analyze", "approach", "area", "assessment",
    "assume", "authority", "available", "benefit", "concept", "consistent", "constitutional",
    "context", "contract", "create", "data", "definition", "derived", "distribution", "economic",
    "environment", "established", "estimate", "evidence", "export", "factors", "financial",
    "formula", "function", "identified", "income", "indicate", "individual", "interpretation",
    "involved", "issues", "labor", "legal", "legislation", "major", "method", "occur", "percent",
    "period", "policy", "principle", "procedure", "process", "required", "research", "response",
    "role", "section", "significant", "similar", "source", "specific", "structure", "theory",
    "variables",
];

pub const ADVANCED_WORDS: &[&str] = &[
    "aberration", "abhor", "acquiesce", "alacrity", "amiable", "appease", "arcane", "avarice",
    "brazen", "brevity", "candor", "capricious", "censure", "circuitous", "clandestine", "cogent",
    "condone", "convoluted", "corroborate", "craven", "culpable", "cynical", "dearth", "debacle",
    "decorous", "deleterious", "deride", "desultory", "didactic", "diffident", "dilatory",
    "discordant", "disdain", "disparate", "dormant", "dubious", "ebullient", "eclectic",
    "efficacious", "elicit", "eloquent", "endemic", "ephemeral", "equivocal", "erudite",
    "esoteric", "eulogy", "exacerbate", "exculpate", "exigent", "exonerate", "expedite", "extant",
    "extol", "facetious", "fallacious", "fastidious", "filibuster", "flagrant", "fledgling",
    "fractious", "garrulous", "gratuitous", "gregarious", "hackneyed", "harangue", "hegemony",
    "hermetic", "heterodox", "histrionic", "homogeneous", "hyperbole", "iconoclast",
    "idiosyncrasy", "ignominious", "imbue", "immutable", "impair", "impartial", "impede",
    "impervious", "implacable", "implicit", "impudent", "inadvertent", "inchoate", "incongruous",
    "incontrovertible", "indefatigable", "indigenous", "indolent", "ineffable", "inexorable",
    "ingenuous", "inherent", "inimical", "innocuous", "insipid", "intractable", "intransigent",
    "inveterate", "irascible", "laconic", "languid", "largesse", "latent", "laudable", "lethargic",
    "licentious", "loquacious", "lucid", "luminous", "magnanimous", "malevolent", "malleable",
    "maverick", "mendacious", "mercurial", "meticulous", "misanthrope", "mitigate", "modicum",
    "mollify", "morose", "mundane", "nefarious", "neophyte", "obdurate", "obfuscate", "obsequious",
    "obviate", "odious", "onerous", "opaque", "opprobrium", "ornate", "ostentatious", "palliate",
    "paragon", "partisan", "pathos", "paucity", "pedantic", "pejorative", "pellucid", "penury",
    "perennial", "perfidy", "perfunctory", "pernicious", "perspicacious", "pertinacious",
    "pervasive", "phlegmatic", "pious", "placate", "platitude", "plethora", "polemical", "portent",
    "pragmatic", "precarious", "precocious", "predilection", "prescient", "prevaricate",
    "pristine", "probity", "proclivity", "profligate", "propensity", "propitious", "prosaic",
    "proscribe", "protean", "prurient", "puerile", "pugnacious", "punctilious", "quagmire",
    "quaint", "quandary", "querulous", "quiescent", "quixotic", "raconteur", "rancorous",
    "recalcitrant", "recondite", "refute", "relegate", "relinquish", "reprehensible", "repudiate",
    "rescind", "reticent", "reverent", "sagacious", "salubrious", "sanctimonious", "sanguine",
    "sardonic", "scurrilous", "sedulous", "sententious", "serendipity", "somnolent", "specious",
    "spurious", "stolid", "strident", "stringent", "sublime", "surreptitious", "sycophant",
    "tacit", "taciturn", "tantamount", "tenuous", "timorous", "tirade", "torpid", "tortuous",
    "truculent", "turgid", "ubiquitous", "umbrage", "unctuous", "undaunted", "untenable",
    "vacillate", "venerable", "veracity", "verbose", "vexation", "vicarious", "vilify", "viscous",
    "vitriolic", "volatile", "voracious", "wary", "welter", "whimsical", "zealous",
];

/// Programming, machine learning, science, mathematics and business terms.
pub const TECHNICAL_TERMS: &[&str] = &[
    "algorithm", "array", "boolean", "class", "constructor", "debug", "exception", "function",
    "hash", "inheritance", "iteration", "javascript", "keyword", "library", "method", "null",
    "object", "parameter", "query", "recursion", "string", "syntax", "variable", "framework",
    "api", "database", "server", "client", "protocol", "authentication", "encryption",
    "compilation", "deployment", "repository", "version", "branch", "merge", "commit", "pull",
    "push", "clone", "fork", "neural", "network", "learning", "artificial", "intelligence",
    "machine", "deep", "transformer", "attention", "embedding", "gradient", "backpropagation",
    "epoch", "batch", "training", "validation", "testing", "overfitting", "underfitting",
    "regularization", "dropout", "activation", "sigmoid", "relu", "tanh", "softmax", "convolution",
    "pooling", "lstm", "gru", "bert", "gpt", "attention", "self-attention", "multi-head",
    "positional", "encoding", "tokenization", "preprocessing", "inference", "model", "weights",
    "bias", "loss", "accuracy", "precision", "recall", "f1-score", "hypothesis", "experiment",
    "observation", "analysis", "synthesis", "methodology", "empirical", "theoretical",
    "statistical", "correlation", "causation", "variable", "control", "randomization", "sample",
    "population", "distribution", "probability", "quantum", "molecular", "atomic", "genetic",
    "biochemical", "physiological", "neurological", "psychological", "sociological",
    "anthropological", "archaeological", "calculus", "derivative", "integral", "differential",
    "equation", "matrix", "vector", "scalar", "tensor", "polynomial", "exponential", "logarithmic",
    "trigonometric", "algebraic", "geometric", "topological", "combinatorial", "probabilistic",
    "stochastic", "revenue", "profit", "margin", "investment", "portfolio", "asset", "liability",
    "equity", "dividend", "interest", "inflation", "deflation", "recession", "expansion", "market",
    "supply", "demand", "elasticity", "monopoly", "competition", "regulation", "globalization",
    "sustainability", "innovation", "disruption", "scalability",
];

/// Medical, legal, finance and education terms.
pub const DOMAIN_TERMS: &[&str] = &[
    "anatomy", "physiology", "pathology", "diagnosis", "treatment", "therapy", "surgery",
    "medicine", "pharmaceutical", "clinical", "symptoms", "syndrome", "disease", "infection",
    "virus", "bacteria", "antibiotic", "vaccine", "immunology", "oncology", "cardiology",
    "neurology", "psychiatry", "pediatrics", "contract", "agreement", "clause", "litigation",
    "arbitration", "mediation", "jurisdiction", "statute", "regulation", "compliance", "liability",
    "damages", "plaintiff", "defendant", "evidence", "testimony", "verdict", "appeal",
    "constitutional", "criminal", "civil", "administrative", "corporate", "intellectual",
    "investment", "portfolio", "securities", "bonds", "stocks", "derivatives", "options",
    "futures", "commodities", "forex", "cryptocurrency", "blockchain", "trading", "analysis",
    "valuation", "risk", "return", "volatility", "liquidity", "capital", "leverage", "hedge",
    "arbitrage", "diversification", "curriculum", "pedagogy", "assessment", "evaluation",
    "learning", "teaching", "instruction", "methodology", "cognition", "development", "psychology",
    "motivation", "engagement", "achievement", "performance", "standards", "accreditation",
    "certification", "qualification", "competency", "skill", "knowledge",
];

/// Multi-word expressions; each adds its words and an underscore-joined token.
pub const PHRASES: &[&str] = &[
    "in other words", "on the other hand", "as a matter of fact", "in conclusion", "for example",
    "in addition", "furthermore", "moreover", "however", "nevertheless", "in contrast",
    "similarly", "likewise", "in particular", "specifically", "that is to say", "in essence",
    "fundamentally", "ultimately", "essentially", "machine learning", "artificial intelligence",
    "neural network", "deep learning", "natural language processing", "computer vision",
    "data science", "big data", "cloud computing", "quantum computing", "software engineering",
    "web development", "mobile development", "user experience", "user interface",
    "database management", "I understand", "that makes sense", "let me think", "in my opinion",
    "from my perspective", "as I see it", "it seems to me", "I believe", "in my experience",
    "generally speaking", "broadly speaking", "more specifically", "to be honest",
    "frankly speaking", "between you and me", "as far as I know",
];

pub const INTERNATIONAL_WORDS: &[&str] = &[
    "café", "résumé", "fiancé", "naïve", "cliché", "elite", "façade", "genre", "liaison",
    "matinée", "protégé", "soirée", "vis-à-vis", "entrepreneur", "karaoke", "tsunami", "sushi",
    "anime", "manga", "zen", "origami", "pizza", "pasta", "cappuccino", "espresso", "soprano",
    "piano", "forte", "kindergarten", "schadenfreude", "zeitgeist", "wanderlust", "gesundheit",
    "tango", "siesta", "fiesta", "plaza", "mesa", "canyon", "ranch", "vodka", "sputnik",
    "cosmonaut", "babushka", "troika", "perestroika", "phenomenon", "criteria", "data", "formula",
    "hypothesis", "analysis", "synthesis", "metamorphosis", "photosynthesis", "chromosome",
    "genome", "ecosystem", "biodiversity", "taxonomy", "morphology", "physiology",
];
